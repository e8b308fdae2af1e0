//! # 目標達成判定
//!
//! 目標ごとの状態遷移は `pending → completed` の一方向のみです。
//!
//! - **InspectPoint**: いずれかのエージェントが距離閾値以内かつ相対速度閾値以下
//! - **RelayNode**: 割り当てエージェントが閾値内に入った時刻を記録し、保持時間経過で達成。
//!   閾値外に出るとタイマーをリセット、エージェント消滅時は割り当てごとリセット
//! - **HoldFormationZone**: 半径内のエージェント数が必要数以上（毎ティック数え直し）

use std::collections::BTreeSet;

use tracing::debug;

use crate::models::{IAgent, IMovable};
use crate::tasks::objective::{DEFAULT_INSPECT_VELOCITY_THRESHOLD, Objective, ObjectiveKind};

/// 保持時間比較の丸め誤差許容 (s)
const HOLD_TIME_TOLERANCE: f64 = 1e-9;

/// 達成判定の結果
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    /// タイマー・割り当て・達成フラグを更新した目標リスト
    pub objectives: Vec<Objective>,
    /// このティックで新たに達成された目標ID（各目標につき1度だけ現れる）
    pub newly_completed: Vec<String>,
}

/// 全目標の達成判定を行う
///
/// # 引数
///
/// * `objectives` - 割り当て後の目標リスト
/// * `agents` - 今ティック適用後のエージェント
/// * `sim_time` - 現在のシミュレーション時刻 (s)
///
/// # 戻り値
///
/// 更新後の目標リストと新規達成IDのリスト
pub fn evaluate_completion<A: IAgent + IMovable>(
    objectives: &[Objective],
    agents: &[A],
    sim_time: f64,
) -> CompletionOutcome {
    let present: BTreeSet<&str> = agents.iter().map(|a| a.get_id()).collect();
    let mut updated = objectives.to_vec();
    let mut newly_completed = Vec::new();

    for objective in updated.iter_mut().filter(|o| !o.is_completed()) {
        let point = objective.position;
        let reference_velocity = objective.velocity;
        let objective_id = objective.id.clone();

        let reached = match &mut objective.kind {
            ObjectiveKind::InspectPoint {
                threshold,
                velocity_threshold,
            } => {
                let max_speed = velocity_threshold.unwrap_or(DEFAULT_INSPECT_VELOCITY_THRESHOLD);
                agents.iter().any(|a| {
                    a.get_position().distance(&point) <= *threshold
                        && (a.get_velocity() - reference_velocity).magnitude() <= max_speed
                })
            }
            ObjectiveKind::RelayNode {
                hold_duration,
                threshold,
                assigned_agent,
                hold_start,
            } => {
                let holder = assigned_agent
                    .as_deref()
                    .and_then(|id| agents.iter().find(|a| a.get_id() == id));
                match holder {
                    None => {
                        if assigned_agent.as_deref().is_some_and(|id| !present.contains(id)) {
                            *assigned_agent = None;
                        }
                        *hold_start = None;
                        false
                    }
                    Some(agent) if agent.get_position().distance(&point) <= *threshold => {
                        let start = *hold_start.get_or_insert_with(|| {
                            debug!(
                                objective_id = %objective_id,
                                agent_id = %agent.get_id(),
                                sim_time = sim_time,
                                "RELAY_HOLD_STARTED: 中継ノードの保持を開始しました"
                            );
                            sim_time
                        });
                        sim_time - start + HOLD_TIME_TOLERANCE >= *hold_duration
                    }
                    Some(_) => {
                        if hold_start.take().is_some() {
                            debug!(
                                objective_id = %objective_id,
                                sim_time = sim_time,
                                "RELAY_HOLD_RESET: 閾値外に出たため保持タイマーをリセットしました"
                            );
                        }
                        false
                    }
                }
            }
            ObjectiveKind::HoldFormationZone {
                radius,
                required_agents,
                ..
            } => {
                let inside = agents
                    .iter()
                    .filter(|a| a.get_position().distance(&point) <= *radius)
                    .count();
                inside >= *required_agents
            }
        };

        if reached {
            objective.mark_completed();
            newly_completed.push(objective_id);
        }
    }

    CompletionOutcome {
        objectives: updated,
        newly_completed,
    }
}
