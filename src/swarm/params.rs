use serde::{Deserialize, Serialize};

/// 群制御パラメータ
///
/// 重みはすべて加速度相当 (m/s²) として扱い、ティックごとに Δt を掛けて
/// 速度変化量に換算します。分離の重みは距離の2乗で割る前の係数 (m³/s²) です。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BehaviorParams {
    /// 近傍とみなす半径 (m)
    pub neighbor_radius_m: f64,
    /// 結合の重み
    pub cohesion_weight: f64,
    /// 分離の重み
    pub separation_weight: f64,
    /// 整列の重み
    pub alignment_weight: f64,
    /// 最小離隔距離 (m)
    pub min_separation_m: f64,
    /// 編隊維持の重み
    pub formation_weight: f64,
    /// 目標誘導の重み
    pub objective_weight: f64,
    /// リング編隊の半径 (m)。未指定時はエージェント数から自動決定
    pub ring_radius_m: Option<f64>,
    /// 平面格子の間隔 (m)
    pub plane_spacing_m: Option<f64>,
    /// 立方格子の間隔 (m)
    pub lattice_spacing_m: Option<f64>,
}

impl Default for BehaviorParams {
    fn default() -> Self {
        Self {
            neighbor_radius_m: 50_000.0,
            cohesion_weight: 0.05,
            separation_weight: 1.0e5,
            alignment_weight: 0.1,
            min_separation_m: 500.0,
            formation_weight: 0.1,
            objective_weight: 0.1,
            ring_radius_m: None,
            plane_spacing_m: None,
            lattice_spacing_m: None,
        }
    }
}

impl BehaviorParams {
    /// パラメータの妥当性検証
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("neighbor_radius_m", self.neighbor_radius_m),
            ("cohesion_weight", self.cohesion_weight),
            ("separation_weight", self.separation_weight),
            ("alignment_weight", self.alignment_weight),
            ("min_separation_m", self.min_separation_m),
            ("formation_weight", self.formation_weight),
            ("objective_weight", self.objective_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be a non-negative finite number: {}", name, value));
            }
        }
        for (name, value) in [
            ("ring_radius_m", self.ring_radius_m),
            ("plane_spacing_m", self.plane_spacing_m),
            ("lattice_spacing_m", self.lattice_spacing_m),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v <= 0.0 {
                    return Err(format!("{} must be positive: {}", name, v));
                }
            }
        }
        Ok(())
    }
}
