//! ケプラー方程式 M = E - e·sin E のニュートン・ラフソン解法と近点角の相互変換

use std::f64::consts::PI;

use crate::models::common::math_utils::normalize_angle;

/// 最大反復回数
pub const KEPLER_MAX_ITERATIONS: usize = 50;
/// 残差の収束判定閾値
pub const KEPLER_TOLERANCE: f64 = 1e-12;
/// 導関数 1 - e·cos E の下限（これ未満では更新をスキップ）
const DERIVATIVE_FLOOR: f64 = 1e-10;

/// 平均近点角から離心近点角を求める
///
/// 初期値は E₀ = M（e > 0.8 の場合は π）。導関数が極小の反復は更新を行わずに
/// 次の反復へ進みます。E が非有限値になった場合は M に戻して打ち切ります。
///
/// # 引数
///
/// * `mean_anomaly` - 平均近点角 (rad)
/// * `e` - 離心率 [0, 1)
///
/// # 戻り値
///
/// [0, 2π)に正規化された離心近点角 (rad)
pub fn solve_kepler(mean_anomaly: f64, e: f64) -> f64 {
    let m = normalize_angle(mean_anomaly);
    let mut ecc = if e > 0.8 { PI } else { m };

    for _ in 0..KEPLER_MAX_ITERATIONS {
        let residual = ecc - e * ecc.sin() - m;
        if residual.abs() < KEPLER_TOLERANCE {
            break;
        }
        let derivative = 1.0 - e * ecc.cos();
        if derivative.abs() < DERIVATIVE_FLOOR {
            continue;
        }
        ecc -= residual / derivative;
        if !ecc.is_finite() {
            ecc = m;
            break;
        }
    }

    normalize_angle(ecc)
}

/// 離心近点角 → 真近点角
pub fn eccentric_to_true(eccentric_anomaly: f64, e: f64) -> f64 {
    let beta = (1.0 - e * e).sqrt();
    let (sin_e, cos_e) = eccentric_anomaly.sin_cos();
    normalize_angle((beta * sin_e).atan2(cos_e - e))
}

/// 真近点角 → 離心近点角
pub fn true_to_eccentric(true_anomaly: f64, e: f64) -> f64 {
    let beta = (1.0 - e * e).sqrt();
    let (sin_nu, cos_nu) = true_anomaly.sin_cos();
    normalize_angle((beta * sin_nu).atan2(e + cos_nu))
}

/// 平均近点角 → 真近点角
pub fn mean_to_true(mean_anomaly: f64, e: f64) -> f64 {
    eccentric_to_true(solve_kepler(mean_anomaly, e), e)
}

/// 真近点角 → 平均近点角
pub fn true_to_mean(true_anomaly: f64, e: f64) -> f64 {
    let ecc = true_to_eccentric(true_anomaly, e);
    normalize_angle(ecc - e * ecc.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn residual(m: f64, e: f64) -> f64 {
        let ecc = solve_kepler(m, e);
        let back = normalize_angle(ecc - e * ecc.sin());
        let diff = (back - normalize_angle(m)).abs();
        diff.min(std::f64::consts::TAU - diff)
    }

    #[test]
    fn test_circular_orbit_is_identity() {
        assert!((solve_kepler(1.234, 0.0) - 1.234).abs() < 1e-12);
        assert!((mean_to_true(0.5, 0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_converges_across_eccentricities() {
        for &e in &[0.01, 0.3, 0.7, 0.85, 0.95, 0.99] {
            for k in 0..12 {
                let m = k as f64 * 0.5;
                assert!(residual(m, e) < 1e-9, "e = {}, M = {}", e, m);
            }
        }
    }

    #[test]
    fn test_true_mean_round_trip() {
        let e = 0.4;
        for k in 0..8 {
            let nu = 0.1 + k as f64 * 0.75;
            let back = mean_to_true(true_to_mean(nu, e), e);
            assert!((back - normalize_angle(nu)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_known_value() {
        // M = 1.0, e = 0.5 → E ≈ 1.4987011335
        let ecc = solve_kepler(1.0, 0.5);
        assert!((ecc - 1.498_701_133_5).abs() < 1e-9);
    }
}
