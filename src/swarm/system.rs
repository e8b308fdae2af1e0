//! # 群制御システム
//!
//! 1ティック分の群制御を、前ティックのスナップショットから純粋関数として計算します。
//!
//! ## 処理順序
//!
//! 1. 挙動が有効なエージェントを抽出（無ければ全員ゼロ）
//! 2. 有効エージェントの重心から共有局所座標系を構築
//! 3. 各エージェントの結合・分離・整列・編隊維持ベクトルを合算
//! 4. 局所座標系からECIの速度変化量へ変換（Δt を乗算）
//! 5. `enforce_minimum_separation` で全エージェント間の最小離隔を保証

use std::collections::BTreeMap;

use crate::error::OrbitError;
use crate::models::{Agent, IAgent, IMovable, Vector3};
use crate::orbit::{CartesianState, LocalFrameState, compute_centroid, compute_local_frame};
use crate::swarm::behaviors::{alignment, cohesion, separation};
use crate::swarm::formations::{FormationLayout, FormationType, formation_target};
use crate::swarm::params::BehaviorParams;

/// 最小離隔違反時の分離重みに対する安全倍率
pub const SEPARATION_SAFETY_FACTOR: f64 = 5.0;
/// 離隔判定の数値的下限 (m)
const SEPARATION_FLOOR: f64 = 1e-6;
/// 目標到達とみなす距離 (m)
const TARGET_EPSILON: f64 = 1e-6;

/// 1エージェント分のECI速度変化量
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityAdjustment {
    pub agent_id: String,
    pub delta_v: Vector3,
}

impl VelocityAdjustment {
    pub fn zero(agent_id: &str) -> Self {
        Self {
            agent_id: agent_id.to_string(),
            delta_v: Vector3::ZERO,
        }
    }
}

/// 全エージェントの群制御による速度変化量を計算
///
/// 戻り値は `agents` と同じ順序です。挙動が無効なエージェントにはゼロを返します。
///
/// # 引数
///
/// * `agents` - 前ティックのエージェントのスナップショット
/// * `params` - 群制御パラメータ
/// * `dt` - ティックの時間刻み (s)
///
/// # 戻り値
///
/// 速度変化量のリスト。重心から局所座標系を構築できない場合はエラー
pub fn compute_swarm_adjustments(
    agents: &[Agent],
    params: &BehaviorParams,
    dt: f64,
) -> Result<Vec<VelocityAdjustment>, OrbitError> {
    let mut adjustments: Vec<VelocityAdjustment> = agents.iter().map(|a| VelocityAdjustment::zero(&a.id)).collect();

    let active: Vec<usize> = agents
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_active())
        .map(|(i, _)| i)
        .collect();
    if active.is_empty() {
        return Ok(adjustments);
    }

    let active_states: Vec<CartesianState> = active.iter().map(|&i| agents[i].get_state()).collect();
    let centroid = compute_centroid(&active_states)?;
    let frame = compute_local_frame(&centroid)?;
    let local: Vec<LocalFrameState> = active_states.iter().map(|s| frame.eci_to_local(s)).collect();

    let slots = formation_slots(agents, &active);
    let layout = FormationLayout {
        ring_radius: params.ring_radius_m,
        plane_spacing: params.plane_spacing_m,
        lattice_spacing: params.lattice_spacing_m,
    };

    for (k, &agent_index) in active.iter().enumerate() {
        let flags = agents[agent_index].behaviors;
        let mut steer = Vector3::ZERO;

        if flags.cohesion {
            steer += cohesion(&local, k, params);
        }
        if flags.separation {
            steer += separation(&local, k, params);
        }
        if flags.alignment {
            steer += alignment(&local, k, params);
        }
        if let Some(&(slot, total)) = slots.get(&k) {
            if let Some(target) = formation_target(flags.formation, slot, total, &layout) {
                let to_target = target - local[k].position;
                if to_target.magnitude() > TARGET_EPSILON {
                    steer += to_target.normalize() * params.formation_weight;
                }
            }
        }

        adjustments[agent_index].delta_v = frame.vector_to_eci(steer) * dt;
    }

    Ok(adjustments)
}

/// 有効エージェント内の位置 k → (編隊内スロット番号, 編隊の機数)
fn formation_slots(agents: &[Agent], active: &[usize]) -> BTreeMap<usize, (usize, usize)> {
    let mut groups: BTreeMap<FormationType, Vec<usize>> = BTreeMap::new();
    for (k, &i) in active.iter().enumerate() {
        let kind = agents[i].behaviors.formation;
        if kind != FormationType::None {
            groups.entry(kind).or_default().push(k);
        }
    }
    groups
        .values()
        .flat_map(|members| {
            let total = members.len();
            members.iter().enumerate().map(move |(slot, &k)| (k, (slot, total)))
        })
        .collect()
}

/// 最小離隔距離の保証
///
/// 挙動フラグに関係なく全エージェントの組を調べ、`min_separation_m` より近い組に
/// (min − d)/min に比例した等大逆向きの斥力速度を加えます。大きさは分離の重みを
/// 最小離隔距離で評価した値に `SEPARATION_SAFETY_FACTOR` を掛けたものです。
///
/// # 引数
///
/// * `agents` - エージェントのスナップショット
/// * `adjustments` - `agents` と同順の速度変化量（加算で更新）
/// * `params` - 群制御パラメータ
/// * `dt` - ティックの時間刻み (s)
pub fn enforce_minimum_separation(
    agents: &[Agent],
    adjustments: &mut [VelocityAdjustment],
    params: &BehaviorParams,
    dt: f64,
) {
    let min_separation = params.min_separation_m;
    if min_separation <= 0.0 {
        return;
    }
    let base = params.separation_weight / (min_separation * min_separation) * SEPARATION_SAFETY_FACTOR;

    for i in 0..agents.len() {
        for j in (i + 1)..agents.len() {
            let offset = agents[i].get_position() - agents[j].get_position();
            let distance = offset.magnitude();
            if distance >= min_separation || distance <= SEPARATION_FLOOR {
                continue;
            }
            let strength = (min_separation - distance) / min_separation;
            let push = offset / distance * (base * strength * dt);
            adjustments[i].delta_v += push;
            adjustments[j].delta_v -= push;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BehaviorFlags;

    fn agent(id: &str, offset_y: f64, behaviors: BehaviorFlags) -> Agent {
        let state = CartesianState::new(Vector3::new(7.0e6, offset_y, 0.0), Vector3::new(0.0, 7500.0, 0.0));
        Agent::new(id.to_string(), state, behaviors, "blue".to_string(), 10.0)
    }

    #[test]
    fn test_no_active_agents_means_zero() {
        let agents = vec![agent("A", 0.0, BehaviorFlags::default()), agent("B", 100.0, BehaviorFlags::default())];
        let adj = compute_swarm_adjustments(&agents, &BehaviorParams::default(), 1.0).unwrap();
        assert!(adj.iter().all(|a| a.delta_v == Vector3::ZERO));
    }

    #[test]
    fn test_inactive_agent_gets_zero() {
        let flags = BehaviorFlags {
            cohesion: true,
            ..BehaviorFlags::default()
        };
        let agents = vec![
            agent("A", 0.0, flags),
            agent("B", 2000.0, flags),
            agent("C", 1000.0, BehaviorFlags::default()),
        ];
        let adj = compute_swarm_adjustments(&agents, &BehaviorParams::default(), 1.0).unwrap();
        assert_eq!(adj[2].delta_v, Vector3::ZERO);
        assert!(adj[0].delta_v.y > 0.0);
        assert!(adj[1].delta_v.y < 0.0);
        assert_eq!(adj[0].agent_id, "A");
    }

    #[test]
    fn test_adjustment_scales_with_dt() {
        let flags = BehaviorFlags {
            cohesion: true,
            ..BehaviorFlags::default()
        };
        let agents = vec![agent("A", 0.0, flags), agent("B", 2000.0, flags)];
        let params = BehaviorParams::default();
        let one = compute_swarm_adjustments(&agents, &params, 1.0).unwrap();
        let two = compute_swarm_adjustments(&agents, &params, 2.0).unwrap();
        assert!((two[0].delta_v - one[0].delta_v * 2.0).magnitude() < 1e-12);
    }

    #[test]
    fn test_formation_steers_toward_slot() {
        let flags = BehaviorFlags {
            formation: FormationType::Ring,
            ..BehaviorFlags::default()
        };
        let agents = vec![agent("A", 0.0, flags), agent("B", 0.0, flags)];
        let params = BehaviorParams::default();
        let adj = compute_swarm_adjustments(&agents, &params, 1.0).unwrap();
        // リング半径 20 km、スロット0は +along-track（ECIの+Y）
        assert!((adj[0].delta_v.magnitude() - params.formation_weight).abs() < 1e-9);
        assert!(adj[0].delta_v.y > 0.0);
        assert!(adj[1].delta_v.y < 0.0);
    }

    #[test]
    fn test_minimum_separation_is_equal_and_opposite() {
        let agents = vec![
            agent("A", 0.0, BehaviorFlags::default()),
            agent("B", 100.0, BehaviorFlags::default()),
            agent("C", 10_000.0, BehaviorFlags::default()),
        ];
        let params = BehaviorParams::default();
        let mut adj: Vec<VelocityAdjustment> = agents.iter().map(|a| VelocityAdjustment::zero(&a.id)).collect();
        enforce_minimum_separation(&agents, &mut adj, &params, 1.0);
        assert!(adj[0].delta_v.y < 0.0);
        assert!(adj[1].delta_v.y > 0.0);
        assert_eq!(adj[0].delta_v, -adj[1].delta_v);
        assert_eq!(adj[2].delta_v, Vector3::ZERO);
    }
}
