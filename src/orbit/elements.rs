use std::f64::consts::{PI, TAU};

use crate::error::OrbitError;
use crate::models::common::{Vector3, math_utils::normalize_angle};
use crate::orbit::constants::MU_EARTH;
use crate::orbit::kepler;

/// 近点角の表現
///
/// 真近点角か平均近点角のどちらか一方を必ず持ちます。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anomaly {
    /// 真近点角 ν (rad)
    True(f64),
    /// 平均近点角 M (rad)
    Mean(f64),
}

impl Anomaly {
    /// 任意指定の2フィールドから近点角を決定
    ///
    /// どちらか一方だけが指定されている必要があります。どちらも無い場合は
    /// `OrbitError::MissingAnomaly`、両方ある場合は `OrbitError::InvalidElements` を返します。
    pub fn from_optional(true_anomaly: Option<f64>, mean_anomaly: Option<f64>) -> Result<Self, OrbitError> {
        match (true_anomaly, mean_anomaly) {
            (Some(_), Some(_)) => Err(OrbitError::InvalidElements(
                "真近点角と平均近点角は同時に指定できません".to_string(),
            )),
            (Some(nu), None) => Ok(Anomaly::True(normalize_angle(nu))),
            (None, Some(m)) => Ok(Anomaly::Mean(normalize_angle(m))),
            (None, None) => Err(OrbitError::MissingAnomaly),
        }
    }
}

/// 古典軌道要素（楕円軌道のみ）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitalElements {
    /// 軌道長半径 (m)
    pub a: f64,
    /// 離心率 [0, 1)
    pub e: f64,
    /// 軌道傾斜角 [0, π] (rad)
    pub i: f64,
    /// 昇交点赤経 Ω (rad)
    pub raan: f64,
    /// 近地点引数 ω (rad)
    pub arg_periapsis: f64,
    /// 近点角
    pub anomaly: Anomaly,
}

impl OrbitalElements {
    /// 軌道要素を検証して作成
    ///
    /// 角度は[0, 2π)に正規化されます（傾斜角を除く）。
    ///
    /// # 引数
    ///
    /// * `a` - 軌道長半径 (m, 正)
    /// * `e` - 離心率 (0 ≤ e < 1)
    /// * `i` - 軌道傾斜角 (rad, 0 ≤ i ≤ π)
    /// * `raan` - 昇交点赤経 (rad)
    /// * `arg_periapsis` - 近地点引数 (rad)
    /// * `anomaly` - 真近点角または平均近点角
    pub fn new(
        a: f64,
        e: f64,
        i: f64,
        raan: f64,
        arg_periapsis: f64,
        anomaly: Anomaly,
    ) -> Result<Self, OrbitError> {
        let anomaly = match anomaly {
            Anomaly::True(nu) => Anomaly::True(normalize_angle(nu)),
            Anomaly::Mean(m) => Anomaly::Mean(normalize_angle(m)),
        };
        let elements = Self {
            a,
            e,
            i,
            raan: normalize_angle(raan),
            arg_periapsis: normalize_angle(arg_periapsis),
            anomaly,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// 楕円軌道として有効かを検証
    pub fn validate(&self) -> Result<(), OrbitError> {
        if !(self.a.is_finite() && self.a > 0.0) {
            return Err(OrbitError::InvalidElements(format!("軌道長半径は正の値が必要です: {}", self.a)));
        }
        if !(0.0..1.0).contains(&self.e) {
            return Err(OrbitError::InvalidElements(format!("離心率は[0, 1)の範囲が必要です: {}", self.e)));
        }
        if !(0.0..=PI).contains(&self.i) {
            return Err(OrbitError::InvalidElements(format!("軌道傾斜角は[0, π]の範囲が必要です: {}", self.i)));
        }
        let angle = match self.anomaly {
            Anomaly::True(v) | Anomaly::Mean(v) => v,
        };
        if !(self.raan.is_finite() && self.arg_periapsis.is_finite() && angle.is_finite()) {
            return Err(OrbitError::InvalidElements("角度に非有限値が含まれています".to_string()));
        }
        Ok(())
    }

    /// 平均運動 n = √(μ/a³) (rad/s)
    pub fn mean_motion(&self) -> f64 {
        (MU_EARTH / self.a.powi(3)).sqrt()
    }

    /// 軌道周期 (s)
    pub fn period(&self) -> f64 {
        TAU / self.mean_motion()
    }

    /// 半直弦 p = a(1-e²) (m)
    pub fn semi_latus_rectum(&self) -> f64 {
        self.a * (1.0 - self.e * self.e)
    }

    /// 真近点角を返す（平均近点角の場合はケプラー方程式を解く）
    pub fn true_anomaly(&self) -> f64 {
        match self.anomaly {
            Anomaly::True(nu) => nu,
            Anomaly::Mean(m) => kepler::mean_to_true(m, self.e),
        }
    }

    /// 平均近点角を返す
    pub fn mean_anomaly(&self) -> f64 {
        match self.anomaly {
            Anomaly::True(nu) => kepler::true_to_mean(nu, self.e),
            Anomaly::Mean(m) => m,
        }
    }

    /// 近点角のみを差し替えた軌道要素
    pub fn with_anomaly(&self, anomaly: Anomaly) -> Self {
        Self { anomaly, ..*self }
    }
}

/// ECI座標系における状態ベクトル（SI単位）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianState {
    /// 位置 (m)
    pub position: Vector3,
    /// 速度 (m/s)
    pub velocity: Vector3,
}

impl CartesianState {
    pub fn new(position: Vector3, velocity: Vector3) -> Self {
        Self { position, velocity }
    }

    /// 地心距離 (m)
    pub fn radius(&self) -> f64 {
        self.position.magnitude()
    }

    /// 速さ (m/s)
    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    /// 比力学的エネルギー ε = v²/2 - μ/r (J/kg)
    pub fn specific_energy(&self) -> f64 {
        let v = self.speed();
        0.5 * v * v - MU_EARTH / self.radius()
    }

    /// 比角運動量 h = r × v
    pub fn angular_momentum(&self) -> Vector3 {
        self.position.cross(&self.velocity)
    }

    /// 有限値かつ地心距離が正であることを検証
    pub fn validate(&self) -> Result<(), OrbitError> {
        if !(self.position.is_finite() && self.velocity.is_finite()) {
            return Err(OrbitError::NonFiniteState);
        }
        let r = self.radius();
        if r <= 0.0 {
            return Err(OrbitError::DegeneratePosition { magnitude: r });
        }
        Ok(())
    }
}
