// 群制御パラメータ
pub mod params;

// 結合・分離・整列カーネル
pub mod behaviors;

// 編隊目標位置の生成
pub mod formations;

// ティックごとの群制御オーケストレーション
pub mod system;

pub use formations::{FormationLayout, FormationType, formation_target};
pub use params::BehaviorParams;
pub use system::{VelocityAdjustment, compute_swarm_adjustments, enforce_minimum_separation};
