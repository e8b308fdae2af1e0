use serde::{Deserialize, Serialize};

use crate::models::traits::{IAgent, IMovable};
use crate::orbit::CartesianState;
use crate::swarm::formations::FormationType;

/// 群制御挙動のフラグ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct BehaviorFlags {
    #[serde(default)]
    pub cohesion: bool,
    #[serde(default)]
    pub separation: bool,
    #[serde(default)]
    pub alignment: bool,
    #[serde(default)]
    pub formation: FormationType,
}

impl BehaviorFlags {
    /// いずれかの挙動が有効かどうか
    pub fn any_active(&self) -> bool {
        self.cohesion || self.separation || self.alignment || self.formation != FormationType::None
    }
}

/// 軌道上の群エージェント
///
/// 状態ベクトル・挙動フラグ・所属チーム・残りΔvを保持します。
/// `selected` / `hovered` は描画側のフラグで、コアは変更せずにそのまま保持します。
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// エージェントの一意識別子
    pub id: String,
    /// ECI状態ベクトル
    pub state: CartesianState,
    /// 群制御挙動
    pub behaviors: BehaviorFlags,
    /// 所属チーム
    pub team: String,
    /// 残りΔv (m/s, 0以上)
    pub dv_remaining: f64,
    pub selected: bool,
    pub hovered: bool,
}

impl Agent {
    /// 新しいエージェントを作成
    ///
    /// # 引数
    ///
    /// * `id` - エージェントの一意識別子
    /// * `state` - 初期状態ベクトル
    /// * `behaviors` - 群制御挙動フラグ
    /// * `team` - 所属チーム
    /// * `dv_budget` - Δv予算 (m/s)
    pub fn new(id: String, state: CartesianState, behaviors: BehaviorFlags, team: String, dv_budget: f64) -> Self {
        Self {
            id,
            state,
            behaviors,
            team,
            dv_remaining: dv_budget.max(0.0),
            selected: false,
            hovered: false,
        }
    }
}

impl IAgent for Agent {
    fn get_id(&self) -> &str {
        &self.id
    }

    fn is_active(&self) -> bool {
        self.behaviors.any_active()
    }
}

impl IMovable for Agent {
    fn get_state(&self) -> CartesianState {
        self.state
    }

    fn set_state(&mut self, state: CartesianState) {
        self.state = state;
    }
}
