//! # Error モジュール
//!
//! 軌道計算・マニューバ・シミュレーション実行で発生するエラー型を定義します。
//! すべて同期的に呼び出し元へ返され、内部でのリトライは行いません。

use thiserror::Error;

/// 軌道要素・状態ベクトル・局所座標系の計算エラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitError {
    #[error("真近点角と平均近点角のどちらも指定されていません")]
    MissingAnomaly,
    #[error("無効な軌道要素: {0}")]
    InvalidElements(String),
    #[error("双曲線/放物線軌道は扱えません (比エネルギー {energy:.3} J/kg)")]
    HyperbolicTrajectory { energy: f64 },
    #[error("角運動量が小さすぎます (|h| = {magnitude:e})")]
    DegenerateAngularMomentum { magnitude: f64 },
    #[error("基準位置ベクトルが小さすぎます (|r| = {magnitude:e})")]
    DegeneratePosition { magnitude: f64 },
    #[error("状態ベクトルに非有限値が含まれています")]
    NonFiniteState,
    #[error("エージェント集合が空です")]
    EmptyAgentSet,
}

/// インパルスマニューバのエラー
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ManeuverError {
    #[error("残りΔvが負の値です: {0} m/s")]
    NegativeBudget(f64),
    #[error("Δvが不足しています (要求 {requested:.3} m/s, 残り {remaining:.3} m/s)")]
    InsufficientBudget { requested: f64, remaining: f64 },
    #[error("Δvに非有限値が含まれています")]
    NonFiniteDeltaV,
    #[error(transparent)]
    Frame(#[from] OrbitError),
}

/// シミュレーションエンジンのエラー
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Orbit(#[from] OrbitError),
    #[error(transparent)]
    Maneuver(#[from] ManeuverError),
    #[error(transparent)]
    Scenario(#[from] crate::scenario::ScenarioError),
    #[error("エージェントが見つかりません: {0}")]
    UnknownAgent(String),
}
