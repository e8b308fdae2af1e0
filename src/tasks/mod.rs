// ミッション目標モデル
pub mod objective;

// 貪欲法による目標割り当て
pub mod allocation;

// 目標方向への誘導
pub mod steering;

// 目標達成判定
pub mod completion;

pub use allocation::{AllocationOutcome, allocate_objectives};
pub use completion::{CompletionOutcome, evaluate_completion};
pub use objective::{DEFAULT_INSPECT_VELOCITY_THRESHOLD, Objective, ObjectiveKind};
pub use steering::{compute_objective_steering, steering_objective};
