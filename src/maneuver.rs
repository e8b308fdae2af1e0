//! # マニューバモジュール
//!
//! RTN成分で指定されたΔvをECIへ変換し、Δv予算の範囲内でインパルス噴射を適用します。
//! 噴射は瞬間的な速度変化で、位置は変化しません。予算違反は部分適用せずにエラーを返します。

use crate::error::{ManeuverError, OrbitError};
use crate::models::common::Vector3;
use crate::orbit::{CartesianState, compute_local_frame};

/// エージェントへのマニューバ指令
#[derive(Debug, Clone, PartialEq)]
pub struct ManeuverCommand {
    /// 対象エージェントID
    pub agent_id: String,
    /// RTN成分のΔv (m/s)。x = radial, y = along-track, z = cross-track
    pub rtn: Vector3,
}

/// 噴射結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BurnResult {
    /// 噴射後の状態（位置は不変）
    pub state: CartesianState,
    /// 噴射後の残りΔv (m/s)
    pub dv_remaining: f64,
}

/// RTN成分のベクトルを、状態自身の局所座標系を使ってECIへ変換
///
/// # 引数
///
/// * `rtn` - (radial, along-track, cross-track) 成分
/// * `state` - 基準となるECI状態
///
/// # 戻り値
///
/// ECI成分のベクトル。局所座標系を構築できない場合はエラー
pub fn rtn_to_eci(rtn: Vector3, state: &CartesianState) -> Result<Vector3, OrbitError> {
    let frame = compute_local_frame(state)?;
    Ok(frame.vector_to_eci(rtn))
}

/// インパルス噴射を適用
///
/// 入力の状態は変更せず、噴射後の状態と残り予算を新しい値として返します。
///
/// # 引数
///
/// * `state` - 噴射前の状態
/// * `dv` - ECI成分のΔv (m/s)
/// * `dv_remaining` - 噴射前の残りΔv (m/s)
///
/// # 戻り値
///
/// 噴射結果。残り予算が負、または |dv| が予算を超える場合はエラー
pub fn apply_delta_v(state: &CartesianState, dv: Vector3, dv_remaining: f64) -> Result<BurnResult, ManeuverError> {
    if dv_remaining < 0.0 || dv_remaining.is_nan() {
        return Err(ManeuverError::NegativeBudget(dv_remaining));
    }
    let requested = dv.magnitude();
    if !requested.is_finite() {
        return Err(ManeuverError::NonFiniteDeltaV);
    }
    if requested > dv_remaining {
        return Err(ManeuverError::InsufficientBudget {
            requested,
            remaining: dv_remaining,
        });
    }

    Ok(BurnResult {
        state: CartesianState::new(state.position, state.velocity + dv),
        dv_remaining: (dv_remaining - requested).max(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::{EARTH_RADIUS, MU_EARTH};

    fn leo() -> CartesianState {
        let r = EARTH_RADIUS + 400_000.0;
        CartesianState::new(Vector3::new(r, 0.0, 0.0), Vector3::new(0.0, (MU_EARTH / r).sqrt(), 0.0))
    }

    #[test]
    fn test_rtn_along_track_is_velocity_direction() {
        let state = leo();
        let eci = rtn_to_eci(Vector3::new(0.0, 5.0, 0.0), &state).unwrap();
        assert!((eci - Vector3::new(0.0, 5.0, 0.0)).magnitude() < 1e-12);
        let radial = rtn_to_eci(Vector3::new(2.0, 0.0, 0.0), &state).unwrap();
        assert!((radial - Vector3::new(2.0, 0.0, 0.0)).magnitude() < 1e-12);
        let normal = rtn_to_eci(Vector3::new(0.0, 0.0, 3.0), &state).unwrap();
        assert!((normal - Vector3::new(0.0, 0.0, 3.0)).magnitude() < 1e-12);
    }

    #[test]
    fn test_rtn_fails_at_origin() {
        let state = CartesianState::new(Vector3::ZERO, Vector3::new(1.0, 0.0, 0.0));
        assert!(matches!(
            rtn_to_eci(Vector3::new(1.0, 0.0, 0.0), &state),
            Err(OrbitError::DegeneratePosition { .. })
        ));
    }

    #[test]
    fn test_burn_changes_velocity_only() {
        let state = leo();
        let dv = Vector3::new(0.0, 30.0, 40.0);
        let result = apply_delta_v(&state, dv, 100.0).unwrap();
        assert_eq!(result.state.position, state.position);
        assert_eq!(result.state.velocity, state.velocity + dv);
        assert!((result.dv_remaining - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_over_budget_burn_fails_without_mutation() {
        let state = leo();
        let before = state;
        let err = apply_delta_v(&state, Vector3::new(150.0, 0.0, 0.0), 100.0).unwrap_err();
        assert!(matches!(err, ManeuverError::InsufficientBudget { .. }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_negative_budget_fails() {
        let err = apply_delta_v(&leo(), Vector3::ZERO, -1.0).unwrap_err();
        assert_eq!(err, ManeuverError::NegativeBudget(-1.0));
    }

    #[test]
    fn test_exact_budget_leaves_zero() {
        let result = apply_delta_v(&leo(), Vector3::new(0.0, 0.0, 10.0), 10.0).unwrap();
        assert_eq!(result.dv_remaining, 0.0);
    }

    #[test]
    fn test_non_finite_delta_v_fails() {
        let err = apply_delta_v(&leo(), Vector3::new(f64::NAN, 0.0, 0.0), 100.0).unwrap_err();
        assert_eq!(err, ManeuverError::NonFiniteDeltaV);
        let err = apply_delta_v(&leo(), Vector3::new(0.0, f64::INFINITY, 0.0), 100.0).unwrap_err();
        assert_eq!(err, ManeuverError::NonFiniteDeltaV);
    }
}
