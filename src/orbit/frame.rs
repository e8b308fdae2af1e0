//! # 局所（RTN）座標系
//!
//! 基準状態ベクトルから Radial / Along-track / Cross-track の正規直交基底を構築し、
//! ECIとの相互変換を提供します。編隊の重心を原点とする共有座標系として
//! 群制御・マニューバ計算に使用されます。

use crate::error::OrbitError;
use crate::models::common::Vector3;
use crate::orbit::elements::CartesianState;

/// 基準位置として許容する最小の大きさ (m)
const MIN_REFERENCE_RADIUS: f64 = 1e-6;
/// 角運動量が退化しているとみなす閾値
const MIN_ANGULAR_MOMENTUM: f64 = 1e-6;
/// 速度がゼロとみなす閾値 (m/s)
const MIN_VELOCITY: f64 = 1e-6;

/// 局所座標系（原点 + 3つの単位基底ベクトル）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    /// 原点（ECI、通常は編隊重心）
    pub origin: Vector3,
    /// 動径方向 R
    pub radial: Vector3,
    /// 軌道進行方向 T
    pub along_track: Vector3,
    /// 軌道面法線方向 N
    pub cross_track: Vector3,
}

/// 局所座標系で表した位置・速度
///
/// 各ベクトルの (x, y, z) はそれぞれ (radial, along-track, cross-track) 成分です。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrameState {
    pub position: Vector3,
    pub velocity: Vector3,
}

/// 基準状態から局所座標系を構築
///
/// radial = 位置の単位ベクトル、cross-track = r×v の単位ベクトル、
/// along-track = cross-track × radial。純粋な動径運動など角運動量が
/// 退化している場合は、cross-track をワールドZ軸、along-track を速度方向
/// （速度もゼロならワールドX軸）で近似します。
///
/// # 引数
///
/// * `reference` - 基準となるECI状態ベクトル
///
/// # 戻り値
///
/// 構築された局所座標系。基準位置が原点近傍の場合はエラー
pub fn compute_local_frame(reference: &CartesianState) -> Result<LocalFrame, OrbitError> {
    let r = reference.position.magnitude();
    if r.is_nan() || r < MIN_REFERENCE_RADIUS {
        return Err(OrbitError::DegeneratePosition { magnitude: r });
    }
    let radial = reference.position / r;

    let h = reference.position.cross(&reference.velocity);
    let (along_track, cross_track) = if h.magnitude() < MIN_ANGULAR_MOMENTUM {
        let along = if reference.velocity.magnitude() < MIN_VELOCITY {
            Vector3::UNIT_X
        } else {
            reference.velocity.normalize()
        };
        (along, Vector3::UNIT_Z)
    } else {
        let cross = h.normalize();
        (cross.cross(&radial), cross)
    };

    Ok(LocalFrame {
        origin: reference.position,
        radial,
        along_track,
        cross_track,
    })
}

impl LocalFrame {
    /// 方向ベクトルをECIから局所成分へ射影
    pub fn vector_to_local(&self, v: Vector3) -> Vector3 {
        Vector3::new(v.dot(&self.radial), v.dot(&self.along_track), v.dot(&self.cross_track))
    }

    /// 局所成分の方向ベクトルをECIへ再構成（原点オフセットなし）
    pub fn vector_to_eci(&self, v: Vector3) -> Vector3 {
        self.radial * v.x + self.along_track * v.y + self.cross_track * v.z
    }

    /// ECI状態 → 局所座標系の状態（位置は原点からの相対）
    pub fn eci_to_local(&self, state: &CartesianState) -> LocalFrameState {
        LocalFrameState {
            position: self.vector_to_local(state.position - self.origin),
            velocity: self.vector_to_local(state.velocity),
        }
    }

    /// 局所座標系の状態 → ECI状態
    pub fn local_to_eci(&self, local: &LocalFrameState) -> CartesianState {
        CartesianState::new(
            self.origin + self.vector_to_eci(local.position),
            self.vector_to_eci(local.velocity),
        )
    }
}

/// 状態ベクトル集合の重心（位置・速度の成分平均）
///
/// # 戻り値
///
/// 重心状態。集合が空の場合は `OrbitError::EmptyAgentSet`
pub fn compute_centroid(states: &[CartesianState]) -> Result<CartesianState, OrbitError> {
    if states.is_empty() {
        return Err(OrbitError::EmptyAgentSet);
    }
    let count = states.len() as f64;
    let (position_sum, velocity_sum) = states.iter().fold(
        (Vector3::ZERO, Vector3::ZERO),
        |(p, v), s| (p + s.position, v + s.velocity),
    );
    Ok(CartesianState::new(position_sum / count, velocity_sum / count))
}
