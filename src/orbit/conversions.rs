//! 古典軌道要素とECI状態ベクトルの相互変換

use std::f64::consts::TAU;

use crate::error::OrbitError;
use crate::models::common::{Matrix3, Vector3, math_utils::normalize_angle};
use crate::orbit::constants::MU_EARTH;
use crate::orbit::elements::{Anomaly, CartesianState, OrbitalElements};

/// 赤道軌道とみなす昇交点ベクトルの大きさ
const EQUATORIAL_EPSILON: f64 = 1e-10;
/// 円軌道とみなす離心率
const CIRCULAR_EPSILON: f64 = 1e-10;
/// 退化軌道とみなす比角運動量の大きさ (m²/s)
const ANGULAR_MOMENTUM_EPSILON: f64 = 1e-6;

/// 近点座標系(PQW)からECIへの回転行列 R = Rz(Ω)·Rx(i)·Rz(ω)
pub fn perifocal_to_eci(raan: f64, inclination: f64, arg_periapsis: f64) -> Matrix3 {
    Matrix3::rotation_z(raan) * Matrix3::rotation_x(inclination) * Matrix3::rotation_z(arg_periapsis)
}

/// 軌道要素 → ECI状態ベクトル
///
/// 近点角が平均近点角で与えられている場合はケプラー方程式を解いて
/// 真近点角を求めます。近点座標系で位置・速度を構築した後、
/// 3-1-3オイラー回転でECIへ変換します。
///
/// # 引数
///
/// * `elements` - 変換対象の軌道要素
///
/// # 戻り値
///
/// ECI座標系の状態ベクトル。要素が楕円軌道として無効な場合はエラー
pub fn elements_to_cartesian(elements: &OrbitalElements) -> Result<CartesianState, OrbitError> {
    elements.validate()?;

    let e = elements.e;
    let nu = elements.true_anomaly();
    let p = elements.semi_latus_rectum();
    let (sin_nu, cos_nu) = nu.sin_cos();
    let r = p / (1.0 + e * cos_nu);

    let position_pf = Vector3::new(r * cos_nu, r * sin_nu, 0.0);
    let speed_factor = (MU_EARTH / p).sqrt();
    let velocity_pf = Vector3::new(-speed_factor * sin_nu, speed_factor * (e + cos_nu), 0.0);

    let rotation = perifocal_to_eci(elements.raan, elements.i, elements.arg_periapsis);
    let state = CartesianState::new(rotation * position_pf, rotation * velocity_pf);
    state.validate()?;
    Ok(state)
}

/// ECI状態ベクトル → 軌道要素
///
/// 赤道軌道では昇交点赤経を0とし、近地点引数は近地点黄経で代用します。
/// 円軌道では近地点引数を0とし、真近点角の代わりに緯度引数
/// （赤道円軌道では真黄経）を用います。
///
/// # 引数
///
/// * `state` - ECI状態ベクトル
///
/// # 戻り値
///
/// 真近点角を持つ軌道要素。角運動量が退化している場合や
/// 双曲線・放物線軌道の場合はエラー
pub fn cartesian_to_elements(state: &CartesianState) -> Result<OrbitalElements, OrbitError> {
    state.validate()?;

    let r_vec = state.position;
    let v_vec = state.velocity;
    let r = r_vec.magnitude();
    let v = v_vec.magnitude();

    let h_vec = r_vec.cross(&v_vec);
    let h = h_vec.magnitude();
    if h < ANGULAR_MOMENTUM_EPSILON {
        return Err(OrbitError::DegenerateAngularMomentum { magnitude: h });
    }

    let energy = 0.5 * v * v - MU_EARTH / r;
    if energy >= 0.0 {
        return Err(OrbitError::HyperbolicTrajectory { energy });
    }

    let mut a = 1.0 / (2.0 / r - v * v / MU_EARTH);
    if !a.is_finite() || a < 0.0 {
        a = -MU_EARTH / (2.0 * energy);
    }

    let e_vec = (r_vec * (v * v - MU_EARTH / r) - v_vec * r_vec.dot(&v_vec)) / MU_EARTH;
    let e = e_vec.magnitude();

    let i = (h_vec.z / h).clamp(-1.0, 1.0).acos();

    let node = Vector3::UNIT_Z.cross(&h_vec);
    let n = node.magnitude();
    let equatorial = n < EQUATORIAL_EPSILON;
    let circular = e < CIRCULAR_EPSILON;
    let retrograde = h_vec.z < 0.0;

    let raan = if equatorial {
        0.0
    } else {
        let raan = (node.x / n).clamp(-1.0, 1.0).acos();
        if node.y < 0.0 { TAU - raan } else { raan }
    };

    let arg_periapsis = if circular {
        0.0
    } else if equatorial {
        // 近地点黄経（逆行赤道軌道ではX軸まわりの反転を考慮）
        let longitude = e_vec.y.atan2(e_vec.x);
        if retrograde { normalize_angle(-longitude) } else { normalize_angle(longitude) }
    } else {
        let omega = (node.dot(&e_vec) / (n * e)).clamp(-1.0, 1.0).acos();
        if e_vec.z < 0.0 { TAU - omega } else { omega }
    };

    let true_anomaly = if !circular {
        let nu = (e_vec.dot(&r_vec) / (e * r)).clamp(-1.0, 1.0).acos();
        if r_vec.dot(&v_vec) < 0.0 { TAU - nu } else { nu }
    } else if !equatorial {
        // 緯度引数
        let u = (node.dot(&r_vec) / (n * r)).clamp(-1.0, 1.0).acos();
        if r_vec.z < 0.0 { TAU - u } else { u }
    } else {
        // 真黄経
        let longitude = r_vec.y.atan2(r_vec.x);
        if retrograde { -longitude } else { longitude }
    };

    Ok(OrbitalElements {
        a,
        e,
        i,
        raan: normalize_angle(raan),
        arg_periapsis: normalize_angle(arg_periapsis),
        anomaly: Anomaly::True(normalize_angle(true_anomaly)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::constants::EARTH_RADIUS;

    fn angle_close(a: f64, b: f64, tol: f64) -> bool {
        let diff = (normalize_angle(a) - normalize_angle(b)).abs();
        diff.min(TAU - diff) < tol
    }

    #[test]
    fn test_circular_equatorial_state() {
        let a = EARTH_RADIUS + 400_000.0;
        let el = OrbitalElements::new(a, 0.0, 0.0, 0.0, 0.0, Anomaly::True(0.0)).unwrap();
        let state = elements_to_cartesian(&el).unwrap();
        assert!((state.position.x - a).abs() < 1e-6);
        assert!(state.position.y.abs() < 1e-6);
        let v_circ = (MU_EARTH / a).sqrt();
        assert!((state.velocity.y - v_circ).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_inclined_eccentric() {
        let el = OrbitalElements::new(8_000_000.0, 0.15, 0.9, 1.2, 2.3, Anomaly::True(0.7)).unwrap();
        let back = cartesian_to_elements(&elements_to_cartesian(&el).unwrap()).unwrap();
        assert!((back.a - el.a).abs() / el.a < 1e-9);
        assert!((back.e - el.e).abs() < 1e-9);
        assert!((back.i - el.i).abs() < 1e-9);
        assert!(angle_close(back.raan, el.raan, 1e-8));
        assert!(angle_close(back.arg_periapsis, el.arg_periapsis, 1e-8));
        assert!(angle_close(back.true_anomaly(), 0.7, 1e-8));
    }

    #[test]
    fn test_mean_anomaly_input() {
        let el = OrbitalElements::new(7_500_000.0, 0.3, 0.4, 0.0, 0.0, Anomaly::Mean(1.0)).unwrap();
        let back = cartesian_to_elements(&elements_to_cartesian(&el).unwrap()).unwrap();
        assert!(angle_close(back.mean_anomaly(), 1.0, 1e-8));
    }

    #[test]
    fn test_equatorial_eccentric_preserves_position() {
        let el = OrbitalElements::new(9_000_000.0, 0.2, 0.0, 0.0, 1.0, Anomaly::True(0.5)).unwrap();
        let state = elements_to_cartesian(&el).unwrap();
        let back = cartesian_to_elements(&state).unwrap();
        assert_eq!(back.raan, 0.0);
        let again = elements_to_cartesian(&back).unwrap();
        assert!((again.position - state.position).magnitude() < 1e-3);
        assert!((again.velocity - state.velocity).magnitude() < 1e-6);
    }

    #[test]
    fn test_circular_inclined_uses_argument_of_latitude() {
        let el = OrbitalElements::new(7_000_000.0, 0.0, 1.0, 0.5, 0.0, Anomaly::True(2.0)).unwrap();
        let state = elements_to_cartesian(&el).unwrap();
        let back = cartesian_to_elements(&state).unwrap();
        assert_eq!(back.arg_periapsis, 0.0);
        assert!(angle_close(back.true_anomaly(), 2.0, 1e-6));
    }

    #[test]
    fn test_rejects_radial_trajectory() {
        let state = CartesianState::new(Vector3::new(7.0e6, 0.0, 0.0), Vector3::new(100.0, 0.0, 0.0));
        assert!(matches!(
            cartesian_to_elements(&state),
            Err(OrbitError::DegenerateAngularMomentum { .. })
        ));
    }

    #[test]
    fn test_rejects_hyperbolic_trajectory() {
        let r = 7.0e6;
        let escape = (2.0 * MU_EARTH / r).sqrt();
        let state = CartesianState::new(Vector3::new(r, 0.0, 0.0), Vector3::new(0.0, escape * 1.1, 0.0));
        assert!(matches!(
            cartesian_to_elements(&state),
            Err(OrbitError::HyperbolicTrajectory { .. })
        ));
    }

    #[test]
    fn test_rejects_origin_position() {
        let state = CartesianState::new(Vector3::ZERO, Vector3::new(0.0, 7000.0, 0.0));
        assert!(cartesian_to_elements(&state).is_err());
    }
}
