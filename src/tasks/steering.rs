//! # 目標誘導
//!
//! エージェントを担当目標の方向へ向ける速度バイアスを計算します。
//! 出力は `objective_weight` を大きさとする加速度で、呼び出し側が Δt を掛けます。

use crate::models::{IAgent, IMovable, Vector3};
use crate::swarm::BehaviorParams;
use crate::tasks::objective::{Objective, ObjectiveKind};

/// 目標到達とみなす距離 (m)
const ARRIVAL_EPSILON: f64 = 1e-6;

/// エージェントに紐づく目標を1つ選ぶ
///
/// 中継ノード・編隊ゾーンへの明示的な割り当てを優先し、無ければ最寄りの
/// 未達成点検目標を返します。
pub fn steering_objective<'a, A: IAgent + IMovable>(agent: &A, objectives: &'a [Objective]) -> Option<&'a Objective> {
    let pending = || objectives.iter().filter(|o| !o.is_completed());

    if let Some(assigned) = pending().find(|o| o.is_assigned_to(agent.get_id())) {
        return Some(assigned);
    }

    let position = agent.get_position();
    pending()
        .filter(|o| matches!(o.kind, ObjectiveKind::InspectPoint { .. }))
        .min_by(|a, b| {
            let da = a.position.distance(&position);
            let db = b.position.distance(&position);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// 目標方向への誘導ベクトル（ECI）
///
/// # 引数
///
/// * `agent` - 対象エージェント
/// * `objectives` - 割り当て済みの目標リスト
/// * `params` - `objective_weight` を参照
///
/// # 戻り値
///
/// 目標方向の単位ベクトル × `objective_weight`。目標が無いか到達済みならゼロ
pub fn compute_objective_steering<A: IAgent + IMovable>(
    agent: &A,
    objectives: &[Objective],
    params: &BehaviorParams,
) -> Vector3 {
    let Some(objective) = steering_objective(agent, objectives) else {
        return Vector3::ZERO;
    };
    let to_objective = objective.position - agent.get_position();
    if to_objective.magnitude() < ARRIVAL_EPSILON {
        return Vector3::ZERO;
    }
    to_objective.normalize() * params.objective_weight
}
