//! 二体問題の解析解による軌道伝搬
//!
//! 摂動（大気抵抗・J2・第三体）や数値積分は扱いません。状態ベクトルを
//! 軌道要素に変換し、平均近点角を n·Δt だけ進めてから状態ベクトルに戻します。

use crate::error::OrbitError;
use crate::models::common::math_utils::normalize_angle;
use crate::orbit::conversions::{cartesian_to_elements, elements_to_cartesian};
use crate::orbit::elements::{Anomaly, CartesianState};

/// 状態ベクトルを Δt 秒だけ伝搬
///
/// 平均近点角の[0, 2π)への正規化は表現上のもので、結果の状態には影響しません。
/// 同一の `(state, dt)` に対しては常にビット単位で同一の結果を返します。
///
/// # 引数
///
/// * `state` - 伝搬前のECI状態ベクトル
/// * `dt` - 伝搬時間 (s)
///
/// # 戻り値
///
/// 伝搬後の状態ベクトル。軌道要素への変換に失敗した場合はエラー
pub fn propagate_kepler(state: &CartesianState, dt: f64) -> Result<CartesianState, OrbitError> {
    let elements = cartesian_to_elements(state)?;
    let n = elements.mean_motion();
    let m0 = elements.mean_anomaly();
    let m1 = normalize_angle(m0 + n * dt);
    elements_to_cartesian(&elements.with_anomaly(Anomaly::Mean(m1)))
}

/// 複数の状態ベクトルを独立に伝搬
///
/// エージェント間で状態を共有しないため、1件の失敗は他に影響しません。
/// 結果は入力と同じ順序で、エージェントごとの `Result` として返します。
pub fn propagate_kepler_batch(states: &[CartesianState], dt: f64) -> Vec<Result<CartesianState, OrbitError>> {
    states.iter().map(|state| propagate_kepler(state, dt)).collect()
}
