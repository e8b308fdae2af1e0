//! # Simulation モジュール
//!
//! 軌道上の群エージェントを扱うシミュレーションエンジンを提供します。
//!
//! エンジンはクロック・エージェント・目標・群制御パラメータ・得点を所有し、
//! ティックごとに前ティックのスナップショットから全エージェントの更新量を計算して
//! 一括で適用します。同じシード・シナリオ・時間刻みの列からは同じ結果が得られます。
//!
//! ## ティックの処理順序
//!
//! 1. **軌道伝搬**: 全エージェントをケプラー二体解で Δt だけ進める（失敗はエージェント単位で隔離）
//! 2. **目標割り当て**: 貪欲法で中継ノード・編隊ゾーンの割り当てを更新
//! 3. **群制御**: 結合・分離・整列・編隊維持の速度変化量を計算
//! 4. **目標誘導**: 各エージェントの担当目標へ向かう速度変化量を加算
//! 5. **最小離隔**: 近すぎる組に等大逆向きの斥力を加算
//! 6. **一括適用**: 速度変化量をまとめて状態へ反映
//! 7. **達成判定**: 目標の達成・タイマーを更新し、得点を加算
//! 8. **予定マニューバ**: 実行時刻に達した噴射指令を適用
//!
//! ## 使用例
//!
//! ```no_run
//! use orbswarm::scenario::ScenarioConfig;
//! use orbswarm::simulation::SimulationEngine;
//!
//! let config = ScenarioConfig::from_file("scenarios/demo_swarm.yaml")?;
//! let mut engine = SimulationEngine::new(config, 1);
//! engine.initialize()?;
//! engine.run()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::VecDeque;

use tracing::{debug, info, trace, warn};

use crate::clock::SimClock;
use crate::error::{ManeuverError, SimError};
use crate::maneuver::{BurnResult, ManeuverCommand, apply_delta_v, rtn_to_eci};
use crate::models::{Agent, IAgent, IMovable};
use crate::orbit::{CartesianState, propagate_kepler_batch};
use crate::scenario::{ScenarioConfig, ScheduledManeuverConfig, generate_test_agents};
use crate::swarm::{BehaviorParams, VelocityAdjustment, compute_swarm_adjustments, enforce_minimum_separation};
use crate::tasks::{Objective, allocate_objectives, compute_objective_steering, evaluate_completion};

/// 1ティック分の処理結果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickReport {
    /// ティック終了時のシミュレーション時刻 (s)
    pub sim_time: f64,
    /// このティックで進めた時間 (s)。一時停止中は 0
    pub delta: f64,
    /// このティックで新たに達成された目標ID
    pub newly_completed: Vec<String>,
    /// 軌道伝搬に失敗し、前ティックの状態を維持したエージェントID
    pub propagation_failures: Vec<String>,
}

pub struct SimulationEngine {
    pub clock: SimClock,
    pub agents: Vec<Agent>,
    pub objectives: Vec<Objective>,
    pub params: BehaviorParams,
    pub score: u32,
    pub step_count: u64,

    pending_maneuvers: VecDeque<ScheduledManeuverConfig>,
    pub scenario_config: ScenarioConfig,
    pub verbose_level: u8,
}

impl SimulationEngine {
    pub fn new(scenario: ScenarioConfig, verbose_level: u8) -> Self {
        let mut clock = SimClock::new(&scenario.sim.seed, scenario.sim.fixed_dt_s);
        clock.set_time_scale(scenario.sim.time_scale);

        Self {
            clock,
            agents: Vec::new(),
            objectives: Vec::new(),
            params: scenario.behavior,
            score: 0,
            step_count: 0,
            pending_maneuvers: VecDeque::new(),
            scenario_config: scenario,
            verbose_level,
        }
    }

    /// シナリオからエージェント・目標・予定マニューバを構築
    ///
    /// 生成エージェントはクロックの乱数から作るため、クロックのリセット直後に呼べば
    /// 毎回同じ群が得られます。
    pub fn initialize(&mut self) -> Result<(), SimError> {
        if self.verbose_level > 0 {
            info!("シミュレーションエンジンを初期化中...");
        }

        let mut agents = self.scenario_config.build_agents()?;
        if let Some(test_agents) = &self.scenario_config.test_agents {
            let generated = generate_test_agents(test_agents, self.clock.rng_mut())?;
            if self.verbose_level > 1 {
                debug!(count = generated.len(), seed = %self.clock.seed(), "生成エージェントを追加しました");
            }
            agents.extend(generated);
        }

        self.agents = agents;
        self.objectives = self.scenario_config.build_objectives();
        self.pending_maneuvers = self.scenario_config.scheduled_maneuvers().into();
        self.params = self.scenario_config.behavior;
        self.score = 0;
        self.step_count = 0;

        info!(
            agents = self.agents.len(),
            objectives = self.objectives.len(),
            scheduled_maneuvers = self.pending_maneuvers.len(),
            seed = %self.clock.seed(),
            "SIMULATION_INITIALIZED: 初期化完了"
        );

        Ok(())
    }

    /// フレーム経過時間でクロックを進め、進んだ分だけシミュレーションを更新
    pub fn tick(&mut self, frame_delta: f64) -> Result<TickReport, SimError> {
        let delta = self.clock.update(frame_delta);
        if delta == 0.0 {
            return Ok(TickReport {
                sim_time: self.clock.sim_time(),
                ..TickReport::default()
            });
        }
        self.advance(delta)
    }

    /// 固定ステップで1ティック進める（一時停止中でも実行）
    pub fn step(&mut self) -> Result<TickReport, SimError> {
        let delta = self.clock.step();
        self.advance(delta)
    }

    fn advance(&mut self, dt: f64) -> Result<TickReport, SimError> {
        let sim_time = self.clock.sim_time();
        let mut report = TickReport {
            sim_time,
            delta: dt,
            ..TickReport::default()
        };

        // 1. 軌道伝搬
        let states: Vec<CartesianState> = self.agents.iter().map(|a| a.get_state()).collect();
        let mut snapshot = self.agents.clone();
        for (agent, result) in snapshot.iter_mut().zip(propagate_kepler_batch(&states, dt)) {
            match result {
                Ok(state) => agent.set_state(state),
                Err(e) => {
                    warn!(
                        agent_id = %agent.id,
                        sim_time = sim_time,
                        error = %e,
                        "PROPAGATION_FAILED: 軌道伝搬に失敗したため前の状態を維持します"
                    );
                    report.propagation_failures.push(agent.id.clone());
                }
            }
        }

        // 2. 目標割り当て
        let allocation = allocate_objectives(&self.objectives, &snapshot);
        for (objective_id, agent_id) in &allocation.inspect_interest {
            trace!(objective_id = %objective_id, agent_id = %agent_id, "点検目標の担当候補");
        }

        // 3〜5. 群制御・目標誘導・最小離隔
        let mut adjustments = match compute_swarm_adjustments(&snapshot, &self.params, dt) {
            Ok(adjustments) => adjustments,
            Err(e) => {
                warn!(
                    sim_time = sim_time,
                    error = %e,
                    "SWARM_FRAME_DEGENERATE: 共有局所座標系を構築できないため群制御を省略します"
                );
                snapshot.iter().map(|a| VelocityAdjustment::zero(&a.id)).collect()
            }
        };
        for (agent, adjustment) in snapshot.iter().zip(adjustments.iter_mut()) {
            adjustment.delta_v += compute_objective_steering(agent, &allocation.objectives, &self.params) * dt;
        }
        enforce_minimum_separation(&snapshot, &mut adjustments, &self.params, dt);

        // 6. 一括適用
        for (agent, adjustment) in snapshot.iter_mut().zip(&adjustments) {
            agent.apply_velocity_delta(adjustment.delta_v);
        }
        self.agents = snapshot;

        // 7. 達成判定
        let completion = evaluate_completion(&allocation.objectives, &self.agents, sim_time);
        self.objectives = completion.objectives;
        for objective_id in &completion.newly_completed {
            if let Some(objective) = self.objectives.iter().find(|o| &o.id == objective_id) {
                self.score += objective.points;
                info!(
                    objective_id = %objective.id,
                    objective_kind = objective.kind_name(),
                    points = objective.points,
                    total_score = self.score,
                    sim_time = sim_time,
                    "OBJECTIVE_COMPLETED: 目標を達成しました"
                );
            }
        }
        report.newly_completed = completion.newly_completed;

        // 8. 予定マニューバ
        self.fire_scheduled_maneuvers(sim_time);

        self.step_count += 1;
        Ok(report)
    }

    fn fire_scheduled_maneuvers(&mut self, sim_time: f64) {
        while self.pending_maneuvers.front().is_some_and(|m| m.time_s <= sim_time) {
            let Some(scheduled) = self.pending_maneuvers.pop_front() else {
                break;
            };
            if let Err(e) = self.apply_maneuver(&scheduled.command()) {
                warn!(
                    agent_id = %scheduled.agent_id,
                    scheduled_time = scheduled.time_s,
                    sim_time = sim_time,
                    error = %e,
                    "MANEUVER_REJECTED: 予定マニューバを実行できませんでした"
                );
            }
        }
    }

    /// RTN成分のマニューバ指令をエージェントに適用
    ///
    /// 指令はエージェント自身の局所座標系で解釈されます。予算を超える場合は
    /// エージェントを一切変更せずにエラーを返します。
    ///
    /// # 戻り値
    ///
    /// 噴射後の状態と残りΔv
    pub fn apply_maneuver(&mut self, command: &ManeuverCommand) -> Result<BurnResult, SimError> {
        let agent = self
            .agents
            .iter_mut()
            .find(|a| a.id == command.agent_id)
            .ok_or_else(|| SimError::UnknownAgent(command.agent_id.clone()))?;

        let dv = rtn_to_eci(command.rtn, &agent.state).map_err(ManeuverError::from)?;
        let burn = apply_delta_v(&agent.state, dv, agent.dv_remaining)?;

        agent.state = burn.state;
        agent.dv_remaining = burn.dv_remaining;

        info!(
            agent_id = %agent.id,
            dv_radial = command.rtn.x,
            dv_along_track = command.rtn.y,
            dv_cross_track = command.rtn.z,
            dv_magnitude = dv.magnitude(),
            dv_remaining = burn.dv_remaining,
            sim_time = self.clock.sim_time(),
            "MANEUVER_APPLIED: マニューバを実行しました"
        );

        Ok(burn)
    }

    /// シナリオを読み込み直し、得点・クロックを初期状態に戻す（シードは維持）
    pub fn reset(&mut self) -> Result<(), SimError> {
        self.clock.reset();
        self.initialize()
    }

    /// シナリオの終了時刻までフレームを進める
    pub fn run(&mut self) -> Result<(), SimError> {
        let duration = self.scenario_config.sim.duration_s;
        let frame_dt = self.scenario_config.sim.frame_dt_s;

        info!("=== シミュレーション実行開始 ===");

        while self.clock.sim_time() < duration {
            let report = self.tick(frame_dt)?;
            if report.delta == 0.0 {
                warn!(sim_time = self.clock.sim_time(), "クロックが停止しているため実行を中断します");
                break;
            }

            if self.verbose_level > 2 {
                trace!("時刻: {:.1}秒 (ステップ: {})", report.sim_time, self.step_count);
            }

            if self.step_count % 100 == 0 && self.verbose_level > 0 {
                let progress = (report.sim_time / duration) * 100.0;
                info!("進行状況: {:.1}% ({:.1}/{:.1}秒)", progress, report.sim_time, duration);
            }
        }

        let completed = self.objectives.iter().filter(|o| o.is_completed()).count();
        info!("=== シミュレーション完了 ===");
        info!("実行時間: {:.1}秒", self.clock.sim_time());
        info!("総ステップ数: {}", self.step_count);
        info!("達成目標: {}/{}", completed, self.objectives.len());
        info!("得点: {}", self.score);

        Ok(())
    }

    pub fn agent(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.get_id() == id)
    }

    pub fn objective(&self, id: &str) -> Option<&Objective> {
        self.objectives.iter().find(|o| o.id == id)
    }
}
