// 物理定数
pub mod constants;

// 軌道要素と状態ベクトル
pub mod elements;

// ケプラー方程式の数値解法
pub mod kepler;

// 軌道要素 ⇔ 直交座標の変換
pub mod conversions;

// 二体問題の解析的伝搬
pub mod propagator;

// 局所（RTN）座標系
pub mod frame;

pub use constants::*;
pub use conversions::{cartesian_to_elements, elements_to_cartesian};
pub use elements::{Anomaly, CartesianState, OrbitalElements};
pub use frame::{LocalFrame, LocalFrameState, compute_centroid, compute_local_frame};
pub use kepler::solve_kepler;
pub use propagator::{propagate_kepler, propagate_kepler_batch};
