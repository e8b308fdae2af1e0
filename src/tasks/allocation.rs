//! # タスク割り当て
//!
//! 毎ティック、誘導計算の前に1回実行される貪欲法による目標割り当てです。
//! 入力の目標は変更せず、更新後の目標リストを新しい値として返します。
//!
//! ## 種類ごとの規則
//!
//! - **InspectPoint**: 未割り当ての最近傍エージェントを「関心あり」として記録
//!   （永続化しない）。同じパスで複数目標が同じエージェントを奪い合わないためのもの
//! - **RelayNode**: 割り当ては維持（スティッキー）。割り当て先が消滅した場合のみ
//!   解除し、未割り当ての最近傍エージェントを再割り当て
//! - **HoldFormationZone**: 消滅したエージェントを除外し、ゾーン内のエージェントを追加、
//!   必要数に満たなければ未割り当ての最近傍エージェントを追加
//!
//! 既存の有効な割り当ては走査前に確保済みとして扱い、目標の並び順によって
//! スティッキーな割り当てが奪われないようにします。

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::models::{IAgent, IMovable, Vector3};
use crate::tasks::objective::{Objective, ObjectiveKind};

/// 割り当て結果
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationOutcome {
    /// 割り当てを反映した目標リスト（入力と同順）
    pub objectives: Vec<Objective>,
    /// 点検目標ID → このパスで関心を持ったエージェントID
    pub inspect_interest: BTreeMap<String, String>,
}

/// 未確保エージェントのうち目標位置に最も近いもの（同距離はID順）
fn nearest_unclaimed<'a, A: IAgent + IMovable>(
    agents: &'a [A],
    point: Vector3,
    claimed: &BTreeSet<String>,
) -> Option<&'a A> {
    agents
        .iter()
        .filter(|a| !claimed.contains(a.get_id()))
        .map(|a| (a, a.get_position().distance(&point)))
        .min_by(|(a, da), (b, db)| {
            da.partial_cmp(db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.get_id().cmp(b.get_id()))
        })
        .map(|(a, _)| a)
}

/// 目標割り当てを実行
///
/// # 引数
///
/// * `objectives` - 前ティックの目標リスト
/// * `agents` - エージェントのスナップショット
///
/// # 戻り値
///
/// 更新後の目標リストと点検目標への関心マップ
pub fn allocate_objectives<A: IAgent + IMovable>(objectives: &[Objective], agents: &[A]) -> AllocationOutcome {
    let present: BTreeSet<&str> = agents.iter().map(|a| a.get_id()).collect();
    let mut claimed: BTreeSet<String> = BTreeSet::new();
    let mut inspect_interest = BTreeMap::new();
    let mut updated = objectives.to_vec();

    for objective in updated.iter().filter(|o| !o.is_completed()) {
        match &objective.kind {
            ObjectiveKind::RelayNode {
                assigned_agent: Some(id),
                ..
            } if present.contains(id.as_str()) => {
                claimed.insert(id.clone());
            }
            ObjectiveKind::HoldFormationZone { assigned_agents, .. } => {
                claimed.extend(assigned_agents.iter().filter(|id| present.contains(id.as_str())).cloned());
            }
            _ => {}
        }
    }

    for objective in updated.iter_mut().filter(|o| !o.is_completed()) {
        let point = objective.position;
        let objective_id = objective.id.clone();

        match &mut objective.kind {
            ObjectiveKind::InspectPoint { .. } => {
                if let Some(agent) = nearest_unclaimed(agents, point, &claimed) {
                    claimed.insert(agent.get_id().to_string());
                    inspect_interest.insert(objective_id, agent.get_id().to_string());
                }
            }
            ObjectiveKind::RelayNode {
                assigned_agent,
                hold_start,
                ..
            } => {
                if let Some(id) = assigned_agent.as_deref() {
                    if !present.contains(id) {
                        debug!(
                            objective_id = %objective_id,
                            lost_agent_id = %id,
                            "RELAY_ASSIGNMENT_CLEARED: 割り当てエージェントが存在しないため解除しました"
                        );
                        *assigned_agent = None;
                        *hold_start = None;
                    }
                }
                if assigned_agent.is_none() {
                    if let Some(agent) = nearest_unclaimed(agents, point, &claimed) {
                        let id = agent.get_id().to_string();
                        debug!(
                            objective_id = %objective_id,
                            agent_id = %id,
                            "RELAY_ASSIGNED: 中継ノードにエージェントを割り当てました"
                        );
                        claimed.insert(id.clone());
                        *assigned_agent = Some(id);
                    }
                }
            }
            ObjectiveKind::HoldFormationZone {
                radius,
                required_agents,
                assigned_agents,
            } => {
                assigned_agents.retain(|id| present.contains(id.as_str()));

                for agent in agents {
                    if agent.get_position().distance(&point) <= *radius {
                        assigned_agents.insert(agent.get_id().to_string());
                        claimed.insert(agent.get_id().to_string());
                    }
                }

                while assigned_agents.len() < *required_agents {
                    let Some(agent) = nearest_unclaimed(agents, point, &claimed) else {
                        break;
                    };
                    let id = agent.get_id().to_string();
                    claimed.insert(id.clone());
                    assigned_agents.insert(id);
                }
            }
        }
    }

    AllocationOutcome {
        objectives: updated,
        inspect_interest,
    }
}
