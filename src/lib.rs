//! # orbswarm
//!
//! 軌道力学と群制御を組み合わせた決定論的シミュレーションエンジンです。
//!
//! - `orbit`: 軌道要素 ⇔ 状態ベクトル変換、ケプラー伝搬、局所（RTN）座標系
//! - `swarm`: 結合・分離・整列・編隊維持の群制御
//! - `tasks`: ミッション目標の割り当て・誘導・達成判定
//! - `maneuver`: Δv予算付きインパルス噴射
//! - `clock`: 一時停止・時間倍率・シードを持つシミュレーションクロック
//! - `simulation`: 上記を1ティックごとに統合するエンジン

pub mod clock;
pub mod error;
pub mod logging;
pub mod maneuver;
pub mod models;
pub mod orbit;
pub mod scenario;
pub mod simulation;
pub mod swarm;
pub mod tasks;

pub use error::{ManeuverError, OrbitError, SimError};
