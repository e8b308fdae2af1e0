use std::collections::BTreeSet;

use crate::models::common::Vector3;

/// 点検目標の既定速度閾値 (m/s)
pub const DEFAULT_INSPECT_VELOCITY_THRESHOLD: f64 = 10.0;

/// 目標の種類ごとの固有データ
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectiveKind {
    /// 指定点に閾値距離以内・低速度で接近すると達成
    InspectPoint {
        /// 距離閾値 (m)
        threshold: f64,
        /// 速度閾値 (m/s)。未指定時は `DEFAULT_INSPECT_VELOCITY_THRESHOLD`
        velocity_threshold: Option<f64>,
    },
    /// 割り当てエージェントが閾値距離内に一定時間留まると達成
    RelayNode {
        /// 必要な保持時間 (s)
        hold_duration: f64,
        /// 距離閾値 (m)
        threshold: f64,
        /// 割り当て中のエージェントID
        assigned_agent: Option<String>,
        /// 閾値内に入った時刻 (s)
        hold_start: Option<f64>,
    },
    /// 半径内に必要数のエージェントが揃うと達成
    HoldFormationZone {
        /// ゾーン半径 (m)
        radius: f64,
        /// 必要エージェント数
        required_agents: usize,
        /// 割り当て中のエージェントID
        assigned_agents: BTreeSet<String>,
    },
}

/// ミッション目標
///
/// `completed` は false → true の一方向にのみ遷移します。
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub id: String,
    /// 目標位置 (ECI, m)
    pub position: Vector3,
    /// 目標の速度 (ECI, m/s)。点検時の相対速度の基準
    pub velocity: Vector3,
    /// 達成時の得点
    pub points: u32,
    completed: bool,
    pub kind: ObjectiveKind,
}

impl Objective {
    pub fn new(id: String, position: Vector3, points: u32, kind: ObjectiveKind) -> Self {
        Self {
            id,
            position,
            velocity: Vector3::ZERO,
            points,
            completed: false,
            kind,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// 達成済みにする（元には戻らない）
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    /// 種類名（ログ出力用）
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ObjectiveKind::InspectPoint { .. } => "inspect_point",
            ObjectiveKind::RelayNode { .. } => "relay_node",
            ObjectiveKind::HoldFormationZone { .. } => "hold_formation_zone",
        }
    }

    /// 指定エージェントが明示的に割り当てられているか
    pub fn is_assigned_to(&self, agent_id: &str) -> bool {
        match &self.kind {
            ObjectiveKind::InspectPoint { .. } => false,
            ObjectiveKind::RelayNode { assigned_agent, .. } => assigned_agent.as_deref() == Some(agent_id),
            ObjectiveKind::HoldFormationZone { assigned_agents, .. } => assigned_agents.contains(agent_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_is_monotonic() {
        let mut obj = Objective::new(
            "O1".to_string(),
            Vector3::ZERO,
            10,
            ObjectiveKind::InspectPoint {
                threshold: 100.0,
                velocity_threshold: None,
            },
        );
        assert!(!obj.is_completed());
        obj.mark_completed();
        obj.mark_completed();
        assert!(obj.is_completed());
        assert_eq!(obj.kind_name(), "inspect_point");
    }

    #[test]
    fn test_assignment_lookup() {
        let relay = Objective::new(
            "R".to_string(),
            Vector3::ZERO,
            5,
            ObjectiveKind::RelayNode {
                hold_duration: 30.0,
                threshold: 1000.0,
                assigned_agent: Some("A1".to_string()),
                hold_start: None,
            },
        );
        assert!(relay.is_assigned_to("A1"));
        assert!(!relay.is_assigned_to("A2"));
    }
}
