//! 物理定数（SI単位）

/// 地球の平均半径 (m)
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// 地球の重力定数 μ = GM (m³/s²)
pub const MU_EARTH: f64 = 3.986_004_418e14;

/// 地表の標準重力加速度 (m/s²)
pub const SURFACE_GRAVITY: f64 = 9.806_65;
