//! # 群挙動カーネル
//!
//! 結合（cohesion）・分離（separation）・整列（alignment）の各操舵ベクトルを、
//! 同一編隊グループの局所座標系状態から計算します。戻り値はすべて局所座標系
//! (radial, along-track, cross-track) 成分の加速度相当ベクトルです。

use crate::models::common::Vector3;
use crate::orbit::LocalFrameState;
use crate::swarm::params::BehaviorParams;

/// 同一位置とみなす距離 (m)
const MIN_NEIGHBOR_DISTANCE: f64 = 1e-6;

/// `index` 番目のエージェントの近傍（自身を除く、半径内）を列挙
fn neighbors<'a>(
    states: &'a [LocalFrameState],
    index: usize,
    radius: f64,
) -> impl Iterator<Item = (&'a LocalFrameState, f64)> + 'a {
    let own = states[index].position;
    states
        .iter()
        .enumerate()
        .filter(move |(j, _)| *j != index)
        .map(move |(_, other)| (other, own.distance(&other.position)))
        .filter(move |(_, distance)| *distance <= radius)
}

/// 結合: 近傍の平均位置へ向かう単位ベクトル × cohesion_weight
///
/// 近傍がいない場合はゼロベクトル。
pub fn cohesion(states: &[LocalFrameState], index: usize, params: &BehaviorParams) -> Vector3 {
    let Some(own) = states.get(index) else {
        return Vector3::ZERO;
    };
    let (sum, count) = neighbors(states, index, params.neighbor_radius_m)
        .fold((Vector3::ZERO, 0usize), |(sum, count), (other, _)| (sum + other.position, count + 1));
    if count == 0 {
        return Vector3::ZERO;
    }
    let toward = sum / count as f64 - own.position;
    if toward.magnitude() < MIN_NEIGHBOR_DISTANCE {
        return Vector3::ZERO;
    }
    toward.normalize() * params.cohesion_weight
}

/// 分離: 近傍ごとに separation_weight / 距離² の斥力を足し合わせる
///
/// 合計は正規化しないため、密集するほど斥力が積み上がります。
pub fn separation(states: &[LocalFrameState], index: usize, params: &BehaviorParams) -> Vector3 {
    let Some(own) = states.get(index) else {
        return Vector3::ZERO;
    };
    neighbors(states, index, params.neighbor_radius_m)
        .filter(|(_, distance)| *distance > MIN_NEIGHBOR_DISTANCE)
        .fold(Vector3::ZERO, |acc, (other, distance)| {
            let away = (own.position - other.position) / distance;
            acc + away * (params.separation_weight / (distance * distance))
        })
}

/// 整列: 近傍の平均速度と自身の速度の差 × alignment_weight
pub fn alignment(states: &[LocalFrameState], index: usize, params: &BehaviorParams) -> Vector3 {
    let Some(own) = states.get(index) else {
        return Vector3::ZERO;
    };
    let (sum, count) = neighbors(states, index, params.neighbor_radius_m)
        .fold((Vector3::ZERO, 0usize), |(sum, count), (other, _)| (sum + other.velocity, count + 1));
    if count == 0 {
        return Vector3::ZERO;
    }
    (sum / count as f64 - own.velocity) * params.alignment_weight
}
