//! 編隊目標位置の生成（インデックス計算のみの純粋関数）
//!
//! 目標位置は局所座標系 (radial, along-track, cross-track) で返します。

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::models::common::Vector3;

/// リング半径の自動スケール係数 (m / 機)
pub const RING_RADIUS_PER_AGENT: f64 = 10_000.0;
/// 格子間隔の既定値 (m)
pub const DEFAULT_GRID_SPACING: f64 = 5_000.0;

/// 編隊の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormationType {
    #[default]
    None,
    Ring,
    Plane,
    Lattice,
}

/// 編隊ごとの寸法設定
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FormationLayout {
    pub ring_radius: Option<f64>,
    pub plane_spacing: Option<f64>,
    pub lattice_spacing: Option<f64>,
}

/// n 以上となる最小の k^dim を与える k（整数演算で決定）
fn grid_size(total: usize, dim: u32) -> usize {
    let mut size = 1usize;
    while size.pow(dim) < total {
        size += 1;
    }
    size
}

/// リング編隊: along-track / cross-track 平面上の等角度配置
///
/// 半径の既定値は 10 000 m × max(n, 1)。
pub fn ring_target(index: usize, total: usize, radius: Option<f64>) -> Vector3 {
    let n = total.max(1);
    let radius = radius.unwrap_or(RING_RADIUS_PER_AGENT * n as f64);
    let angle = TAU * index as f64 / n as f64;
    Vector3::new(0.0, radius * angle.cos(), radius * angle.sin())
}

/// 平面編隊: ⌈√n⌉ 列の中心揃え格子（along-track / cross-track 平面）
pub fn plane_target(index: usize, total: usize, spacing: Option<f64>) -> Vector3 {
    let spacing = spacing.unwrap_or(DEFAULT_GRID_SPACING);
    let size = grid_size(total, 2);
    let offset = (size as f64 - 1.0) / 2.0;
    let col = (index % size) as f64;
    let row = (index / size) as f64;
    Vector3::new(0.0, (col - offset) * spacing, (row - offset) * spacing)
}

/// 立方格子編隊: ⌈∛n⌉ の中心揃え3次元格子
pub fn lattice_target(index: usize, total: usize, spacing: Option<f64>) -> Vector3 {
    let spacing = spacing.unwrap_or(DEFAULT_GRID_SPACING);
    let size = grid_size(total, 3);
    let offset = (size as f64 - 1.0) / 2.0;
    let x = (index % size) as f64;
    let y = ((index / size) % size) as f64;
    let z = (index / (size * size)) as f64;
    Vector3::new((x - offset) * spacing, (y - offset) * spacing, (z - offset) * spacing)
}

/// 編隊種別に応じて目標位置を返す（`None` の場合は目標なし）
pub fn formation_target(kind: FormationType, index: usize, total: usize, layout: &FormationLayout) -> Option<Vector3> {
    match kind {
        FormationType::None => None,
        FormationType::Ring => Some(ring_target(index, total, layout.ring_radius)),
        FormationType::Plane => Some(plane_target(index, total, layout.plane_spacing)),
        FormationType::Lattice => Some(lattice_target(index, total, layout.lattice_spacing)),
    }
}
