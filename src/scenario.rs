//! # Scenario モジュール
//!
//! YAMLシナリオファイルの読み込み・検証と、シナリオ記述からエージェント・目標を
//! 構築する処理を提供します。角度はシナリオ上では度で記述し、読み込み時に
//! ラジアンへ変換します。

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::OrbitError;
use crate::maneuver::ManeuverCommand;
use crate::models::common::math_utils::deg_to_rad;
use crate::models::{Agent, BehaviorFlags, Vector3};
use crate::orbit::{
    Anomaly, CartesianState, EARTH_RADIUS, OrbitalElements, cartesian_to_elements, elements_to_cartesian,
};
use crate::swarm::BehaviorParams;
use crate::tasks::{Objective, ObjectiveKind};

/// シナリオメタデータ
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// シミュレーション設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// 乱数シード文字列
    pub seed: String,
    /// シングルステップ時の時間刻み (s)
    pub fixed_dt_s: f64,
    /// 実行時の1フレームの経過時間 (s)
    pub frame_dt_s: f64,
    /// シミュレーション時間 (s)
    pub duration_s: f64,
    /// 時間倍率
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
}

fn default_time_scale() -> f64 {
    1.0
}

/// 古典軌道要素（角度は度）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ElementsConfig {
    pub a_m: f64,
    pub e: f64,
    pub i_deg: f64,
    pub raan_deg: f64,
    pub arg_periapsis_deg: f64,
    #[serde(default)]
    pub true_anomaly_deg: Option<f64>,
    #[serde(default)]
    pub mean_anomaly_deg: Option<f64>,
}

impl ElementsConfig {
    /// ラジアン表現の軌道要素へ変換（近点角はどちらか一方のみ）
    pub fn to_elements(&self) -> Result<OrbitalElements, OrbitError> {
        let anomaly = Anomaly::from_optional(
            self.true_anomaly_deg.map(deg_to_rad),
            self.mean_anomaly_deg.map(deg_to_rad),
        )?;
        OrbitalElements::new(
            self.a_m,
            self.e,
            deg_to_rad(self.i_deg),
            deg_to_rad(self.raan_deg),
            deg_to_rad(self.arg_periapsis_deg),
            anomaly,
        )
    }
}

/// ECI状態ベクトル
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CartesianConfig {
    pub position_m: [f64; 3],
    pub velocity_mps: [f64; 3],
}

/// 初期軌道（`elements` か `cartesian` のどちらか一方）
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OrbitConfig {
    #[serde(default)]
    pub elements: Option<ElementsConfig>,
    #[serde(default)]
    pub cartesian: Option<CartesianConfig>,
}

impl OrbitConfig {
    /// 初期状態ベクトルへ変換
    pub fn to_state(&self) -> Result<CartesianState, OrbitError> {
        match (&self.elements, &self.cartesian) {
            (Some(elements), None) => elements_to_cartesian(&elements.to_elements()?),
            (None, Some(cartesian)) => {
                let state = CartesianState::new(
                    Vector3::from_array(cartesian.position_m),
                    Vector3::from_array(cartesian.velocity_mps),
                );
                state.validate()?;
                // 楕円軌道として要素化できない状態（双曲線・角運動量ゼロ）は読み込み時に拒否
                cartesian_to_elements(&state)?;
                Ok(state)
            }
            (Some(_), Some(_)) => Err(OrbitError::InvalidElements(
                "elements と cartesian は同時に指定できません".to_string(),
            )),
            (None, None) => Err(OrbitError::InvalidElements(
                "elements か cartesian のどちらかが必要です".to_string(),
            )),
        }
    }
}

/// エージェント設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AgentConfig {
    pub id: String,
    #[serde(default = "default_team")]
    pub team: String,
    #[serde(default)]
    pub dv_budget_mps: f64,
    #[serde(default)]
    pub behaviors: BehaviorFlags,
    pub orbit: OrbitConfig,
}

fn default_team() -> String {
    "blue".to_string()
}

impl AgentConfig {
    pub fn build(&self) -> Result<Agent, ScenarioError> {
        let state = self.orbit.to_state().map_err(|source| ScenarioError::Orbit {
            agent_id: self.id.clone(),
            source,
        })?;
        Ok(Agent::new(
            self.id.clone(),
            state,
            self.behaviors,
            self.team.clone(),
            self.dv_budget_mps,
        ))
    }
}

/// シード付きランダムLEO群の生成設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TestAgentsConfig {
    pub count: usize,
    pub id_prefix: String,
    pub team: String,
    pub altitude_min_m: f64,
    pub altitude_max_m: f64,
    pub max_eccentricity: f64,
    pub inclination_min_deg: f64,
    pub inclination_max_deg: f64,
    pub dv_budget_mps: f64,
    pub behaviors: BehaviorFlags,
}

impl Default for TestAgentsConfig {
    fn default() -> Self {
        Self {
            count: 0,
            id_prefix: "T".to_string(),
            team: "test".to_string(),
            altitude_min_m: 400_000.0,
            altitude_max_m: 600_000.0,
            max_eccentricity: 0.001,
            inclination_min_deg: 0.0,
            inclination_max_deg: 98.0,
            dv_budget_mps: 50.0,
            behaviors: BehaviorFlags::default(),
        }
    }
}

impl TestAgentsConfig {
    /// `index` 番目（0始まり）の生成エージェントID
    pub fn agent_id(&self, index: usize) -> String {
        format!("{}{:03}", self.id_prefix, index + 1)
    }
}

/// 目標設定（`type` で種類を指定）
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectiveConfig {
    InspectPoint {
        id: String,
        position_m: [f64; 3],
        #[serde(default)]
        velocity_mps: Option<[f64; 3]>,
        #[serde(default)]
        points: u32,
        threshold_m: f64,
        #[serde(default)]
        velocity_threshold_mps: Option<f64>,
    },
    RelayNode {
        id: String,
        position_m: [f64; 3],
        #[serde(default)]
        points: u32,
        threshold_m: f64,
        hold_duration_s: f64,
    },
    HoldFormationZone {
        id: String,
        position_m: [f64; 3],
        #[serde(default)]
        points: u32,
        radius_m: f64,
        required_agents: usize,
    },
}

impl ObjectiveConfig {
    pub fn id(&self) -> &str {
        match self {
            ObjectiveConfig::InspectPoint { id, .. }
            | ObjectiveConfig::RelayNode { id, .. }
            | ObjectiveConfig::HoldFormationZone { id, .. } => id,
        }
    }

    pub fn build(&self) -> Objective {
        match self {
            ObjectiveConfig::InspectPoint {
                id,
                position_m,
                velocity_mps,
                points,
                threshold_m,
                velocity_threshold_mps,
            } => Objective::new(
                id.clone(),
                Vector3::from_array(*position_m),
                *points,
                ObjectiveKind::InspectPoint {
                    threshold: *threshold_m,
                    velocity_threshold: *velocity_threshold_mps,
                },
            )
            .with_velocity(velocity_mps.map(Vector3::from_array).unwrap_or(Vector3::ZERO)),
            ObjectiveConfig::RelayNode {
                id,
                position_m,
                points,
                threshold_m,
                hold_duration_s,
            } => Objective::new(
                id.clone(),
                Vector3::from_array(*position_m),
                *points,
                ObjectiveKind::RelayNode {
                    hold_duration: *hold_duration_s,
                    threshold: *threshold_m,
                    assigned_agent: None,
                    hold_start: None,
                },
            ),
            ObjectiveConfig::HoldFormationZone {
                id,
                position_m,
                points,
                radius_m,
                required_agents,
            } => Objective::new(
                id.clone(),
                Vector3::from_array(*position_m),
                *points,
                ObjectiveKind::HoldFormationZone {
                    radius: *radius_m,
                    required_agents: *required_agents,
                    assigned_agents: BTreeSet::new(),
                },
            ),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let positive = |name: &str, value: f64| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(format!("objective {}: {} must be positive", self.id(), name))
            }
        };
        match self {
            ObjectiveConfig::InspectPoint {
                position_m,
                threshold_m,
                velocity_threshold_mps,
                ..
            } => {
                check_finite(self.id(), position_m)?;
                positive("threshold_m", *threshold_m)?;
                if let Some(v) = velocity_threshold_mps {
                    positive("velocity_threshold_mps", *v)?;
                }
            }
            ObjectiveConfig::RelayNode {
                position_m,
                threshold_m,
                hold_duration_s,
                ..
            } => {
                check_finite(self.id(), position_m)?;
                positive("threshold_m", *threshold_m)?;
                if !(*hold_duration_s >= 0.0 && hold_duration_s.is_finite()) {
                    return Err(format!("objective {}: hold_duration_s must be non-negative", self.id()));
                }
            }
            ObjectiveConfig::HoldFormationZone {
                position_m,
                radius_m,
                required_agents,
                ..
            } => {
                check_finite(self.id(), position_m)?;
                positive("radius_m", *radius_m)?;
                if *required_agents == 0 {
                    return Err(format!("objective {}: required_agents must be at least 1", self.id()));
                }
            }
        }
        Ok(())
    }
}

fn check_finite(id: &str, v: &[f64; 3]) -> Result<(), String> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(format!("{}: vector contains non-finite values", id))
    }
}

/// 予定マニューバ（指定時刻に到達した最初のティックで実行）
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduledManeuverConfig {
    pub time_s: f64,
    pub agent_id: String,
    /// RTN成分のΔv (m/s)
    pub rtn_mps: [f64; 3],
}

impl ScheduledManeuverConfig {
    pub fn command(&self) -> ManeuverCommand {
        ManeuverCommand {
            agent_id: self.agent_id.clone(),
            rtn: Vector3::from_array(self.rtn_mps),
        }
    }
}

/// 完全なシナリオ設定
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub sim: SimulationConfig,
    #[serde(default)]
    pub behavior: BehaviorParams,
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
    #[serde(default)]
    pub test_agents: Option<TestAgentsConfig>,
    #[serde(default)]
    pub objectives: Vec<ObjectiveConfig>,
    #[serde(default)]
    pub maneuvers: Vec<ScheduledManeuverConfig>,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_yaml_str(&contents).map_err(|e| match e {
            ScenarioError::Parse { source, .. } => ScenarioError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        Ok(config)
    }

    /// YAML文字列からシナリオ設定を読み込み（検証込み）
    pub fn from_yaml_str(contents: &str) -> Result<Self, ScenarioError> {
        let config: ScenarioConfig = serde_yaml::from_str(contents).map_err(|source| ScenarioError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 設定の検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let sim = &self.sim;
        if !(sim.fixed_dt_s > 0.0 && sim.fixed_dt_s.is_finite()) {
            return Err(ScenarioError::Validation("fixed_dt_s must be positive".to_string()));
        }
        if !(sim.frame_dt_s > 0.0 && sim.frame_dt_s.is_finite()) {
            return Err(ScenarioError::Validation("frame_dt_s must be positive".to_string()));
        }
        if !(sim.duration_s > 0.0 && sim.duration_s.is_finite()) {
            return Err(ScenarioError::Validation("duration_s must be positive".to_string()));
        }
        if !(0.1..=100.0).contains(&sim.time_scale) {
            return Err(ScenarioError::Validation(format!(
                "time_scale must be within [0.1, 100]: {}",
                sim.time_scale
            )));
        }

        self.behavior.validate().map_err(ScenarioError::Validation)?;

        let mut agent_ids = BTreeSet::new();
        for agent in &self.agents {
            if !agent_ids.insert(agent.id.clone()) {
                return Err(ScenarioError::Validation(format!("duplicate agent id: {}", agent.id)));
            }
            if !(agent.dv_budget_mps >= 0.0 && agent.dv_budget_mps.is_finite()) {
                return Err(ScenarioError::Validation(format!(
                    "agent {}: dv_budget_mps must be non-negative",
                    agent.id
                )));
            }
            agent.orbit.to_state().map_err(|source| ScenarioError::Orbit {
                agent_id: agent.id.clone(),
                source,
            })?;
        }

        if let Some(test_agents) = &self.test_agents {
            if !(test_agents.altitude_min_m >= 0.0 && test_agents.altitude_min_m <= test_agents.altitude_max_m) {
                return Err(ScenarioError::Validation("test_agents: invalid altitude range".to_string()));
            }
            if !(0.0..1.0).contains(&test_agents.max_eccentricity) {
                return Err(ScenarioError::Validation(
                    "test_agents: max_eccentricity must be within [0, 1)".to_string(),
                ));
            }
            let inclination_ok = (0.0..=180.0).contains(&test_agents.inclination_min_deg)
                && (0.0..=180.0).contains(&test_agents.inclination_max_deg)
                && test_agents.inclination_min_deg <= test_agents.inclination_max_deg;
            if !inclination_ok {
                return Err(ScenarioError::Validation("test_agents: invalid inclination range".to_string()));
            }
            if test_agents.dv_budget_mps.is_nan() || test_agents.dv_budget_mps < 0.0 {
                return Err(ScenarioError::Validation(
                    "test_agents: dv_budget_mps must be non-negative".to_string(),
                ));
            }
            for index in 0..test_agents.count {
                let id = test_agents.agent_id(index);
                if !agent_ids.insert(id.clone()) {
                    return Err(ScenarioError::Validation(format!("duplicate agent id: {}", id)));
                }
            }
        }

        let mut objective_ids = BTreeSet::new();
        for objective in &self.objectives {
            if !objective_ids.insert(objective.id().to_string()) {
                return Err(ScenarioError::Validation(format!("duplicate objective id: {}", objective.id())));
            }
            objective.validate().map_err(ScenarioError::Validation)?;
        }

        for maneuver in &self.maneuvers {
            if !agent_ids.contains(&maneuver.agent_id) {
                return Err(ScenarioError::Validation(format!(
                    "maneuver references unknown agent: {}",
                    maneuver.agent_id
                )));
            }
            if !(maneuver.time_s >= 0.0 && maneuver.time_s.is_finite()) {
                return Err(ScenarioError::Validation(format!(
                    "maneuver for {}: time_s must be non-negative",
                    maneuver.agent_id
                )));
            }
            check_finite(&maneuver.agent_id, &maneuver.rtn_mps).map_err(ScenarioError::Validation)?;
        }

        Ok(())
    }

    /// シナリオ記述のエージェントを構築（生成エージェントは含まない）
    pub fn build_agents(&self) -> Result<Vec<Agent>, ScenarioError> {
        self.agents.iter().map(AgentConfig::build).collect()
    }

    /// 目標を構築
    pub fn build_objectives(&self) -> Vec<Objective> {
        self.objectives.iter().map(ObjectiveConfig::build).collect()
    }

    /// 予定マニューバを実行時刻順に並べて返す（同時刻は記述順）
    pub fn scheduled_maneuvers(&self) -> Vec<ScheduledManeuverConfig> {
        let mut maneuvers = self.maneuvers.clone();
        maneuvers.sort_by(|a, b| a.time_s.total_cmp(&b.time_s));
        maneuvers
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("固定ステップ: {:.3}秒", self.sim.fixed_dt_s);
        println!("フレーム間隔: {:.3}秒", self.sim.frame_dt_s);
        println!(
            "シミュレーション時間: {:.1}秒 ({:.1}分)",
            self.sim.duration_s,
            self.sim.duration_s / 60.0
        );
        println!("時間倍率: {:.1}", self.sim.time_scale);
        println!("シード: {}", self.sim.seed);
        println!();

        println!("=== エージェント ===");
        println!("シナリオ記述: {}機", self.agents.len());
        for agent in &self.agents {
            let orbit = if agent.orbit.elements.is_some() { "軌道要素" } else { "状態ベクトル" };
            println!(
                "  {} (チーム: {}, Δv: {:.1} m/s, 初期値: {})",
                agent.id, agent.team, agent.dv_budget_mps, orbit
            );
        }
        if let Some(test_agents) = &self.test_agents {
            println!(
                "生成エージェント: {}機 (高度 {:.0}〜{:.0} km)",
                test_agents.count,
                test_agents.altitude_min_m / 1000.0,
                test_agents.altitude_max_m / 1000.0
            );
        }
        println!();

        println!("=== 目標 ===");
        println!("目標数: {}", self.objectives.len());
        for objective in &self.objectives {
            let built = objective.build();
            println!("  {}: {} ({}点)", built.id, built.kind_name(), built.points);
        }
        if !self.maneuvers.is_empty() {
            println!();
            println!("=== 予定マニューバ ===");
            for maneuver in self.scheduled_maneuvers() {
                println!(
                    "  {:.1}秒: {} RTN [{:.2}, {:.2}, {:.2}] m/s",
                    maneuver.time_s, maneuver.agent_id, maneuver.rtn_mps[0], maneuver.rtn_mps[1], maneuver.rtn_mps[2]
                );
            }
        }
    }
}

/// シード付き乱数から近円LEOのエージェント群を生成
///
/// 乱数は呼び出し側（通常はシミュレーションクロック）が所有するものを使います。
/// 同じシード・同じ設定からは同じエージェント群が生成されます。
///
/// # 引数
///
/// * `config` - 生成設定
/// * `rng` - 乱数生成器
///
/// # 戻り値
///
/// 生成されたエージェントのリスト
pub fn generate_test_agents<R: Rng>(config: &TestAgentsConfig, rng: &mut R) -> Result<Vec<Agent>, OrbitError> {
    (0..config.count)
        .map(|index| {
            let altitude = rng.gen_range(config.altitude_min_m..=config.altitude_max_m);
            let e = rng.gen_range(0.0..=config.max_eccentricity);
            let i = rng.gen_range(config.inclination_min_deg..=config.inclination_max_deg);
            let raan = rng.gen_range(0.0..360.0);
            let arg_periapsis = rng.gen_range(0.0..360.0);
            let nu = rng.gen_range(0.0..360.0);

            let elements = OrbitalElements::new(
                EARTH_RADIUS + altitude,
                e,
                deg_to_rad(i),
                deg_to_rad(raan),
                deg_to_rad(arg_periapsis),
                Anomaly::True(deg_to_rad(nu)),
            )?;
            let state = elements_to_cartesian(&elements)?;
            Ok(Agent::new(
                config.agent_id(index),
                state,
                config.behaviors,
                config.team.clone(),
                config.dv_budget_mps,
            ))
        })
        .collect()
}

/// シナリオ読み込みエラー
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("シナリオファイルが見つかりません: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("ファイル読み込みエラー {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML解析エラー {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("設定検証エラー: {0}")]
    Validation(String),
    #[error("エージェント {agent_id} の初期軌道が不正です: {source}")]
    Orbit {
        agent_id: String,
        #[source]
        source: OrbitError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::rng_from_seed;

    const MINIMAL: &str = r#"
meta:
  version: "1.0"
  name: minimal
sim:
  seed: "unit"
  fixed_dt_s: 1.0
  frame_dt_s: 1.0
  duration_s: 60.0
agents:
  - id: A1
    dv_budget_mps: 20.0
    behaviors:
      cohesion: true
      formation: ring
    orbit:
      elements:
        a_m: 6771000.0
        e: 0.0
        i_deg: 51.6
        raan_deg: 0.0
        arg_periapsis_deg: 0.0
        true_anomaly_deg: 0.0
objectives:
  - type: relay_node
    id: R1
    position_m: [6771000.0, 0.0, 0.0]
    points: 20
    threshold_m: 1000.0
    hold_duration_s: 30.0
"#;

    #[test]
    fn test_parse_minimal_scenario() {
        let config = ScenarioConfig::from_yaml_str(MINIMAL).unwrap();
        assert_eq!(config.sim.time_scale, 1.0);
        assert_eq!(config.behavior, BehaviorParams::default());
        let agents = config.build_agents().unwrap();
        assert_eq!(agents.len(), 1);
        assert!(agents[0].behaviors.cohesion);
        assert!((agents[0].state.radius() - 6_771_000.0).abs() < 1e-3);
        let objectives = config.build_objectives();
        assert_eq!(objectives[0].kind_name(), "relay_node");
    }

    #[test]
    fn test_missing_anomaly_is_rejected() {
        let yaml = MINIMAL.replace("        true_anomaly_deg: 0.0\n", "");
        let err = ScenarioConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Orbit {
                source: OrbitError::MissingAnomaly,
                ..
            }
        ));
    }

    #[test]
    fn test_both_anomalies_are_rejected() {
        let yaml = MINIMAL.replace(
            "        true_anomaly_deg: 0.0\n",
            "        true_anomaly_deg: 0.0\n        mean_anomaly_deg: 90.0\n",
        );
        let err = ScenarioConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Orbit {
                source: OrbitError::InvalidElements(_),
                ..
            }
        ));
    }

    #[test]
    fn test_unbound_cartesian_orbit_is_rejected() {
        let elements_block = "      elements:\n        a_m: 6771000.0\n        e: 0.0\n        i_deg: 51.6\n        raan_deg: 0.0\n        arg_periapsis_deg: 0.0\n        true_anomaly_deg: 0.0\n";
        let hyperbolic = MINIMAL.replace(
            elements_block,
            "      cartesian:\n        position_m: [7000000.0, 0.0, 0.0]\n        velocity_mps: [0.0, 12000.0, 0.0]\n",
        );
        assert_ne!(hyperbolic, MINIMAL);
        let err = ScenarioConfig::from_yaml_str(&hyperbolic).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Orbit {
                source: OrbitError::HyperbolicTrajectory { .. },
                ..
            }
        ));

        let radial = MINIMAL.replace(
            elements_block,
            "      cartesian:\n        position_m: [7000000.0, 0.0, 0.0]\n        velocity_mps: [100.0, 0.0, 0.0]\n",
        );
        let err = ScenarioConfig::from_yaml_str(&radial).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Orbit {
                source: OrbitError::DegenerateAngularMomentum { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_maneuver_agent_is_rejected() {
        let yaml = format!("{MINIMAL}maneuvers:\n  - time_s: 5.0\n    agent_id: NOPE\n    rtn_mps: [0.0, 1.0, 0.0]\n");
        let err = ScenarioConfig::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(err, ScenarioError::Validation(_)));
    }

    #[test]
    fn test_both_orbit_forms_rejected() {
        let orbit = OrbitConfig {
            elements: Some(ElementsConfig {
                a_m: 7.0e6,
                e: 0.0,
                i_deg: 0.0,
                raan_deg: 0.0,
                arg_periapsis_deg: 0.0,
                true_anomaly_deg: Some(0.0),
                mean_anomaly_deg: None,
            }),
            cartesian: Some(CartesianConfig {
                position_m: [7.0e6, 0.0, 0.0],
                velocity_mps: [0.0, 7500.0, 0.0],
            }),
        };
        assert!(orbit.to_state().is_err());
    }

    #[test]
    fn test_generated_agents_are_seed_deterministic() {
        let config = TestAgentsConfig {
            count: 5,
            ..TestAgentsConfig::default()
        };
        let a = generate_test_agents(&config, &mut rng_from_seed("swarm")).unwrap();
        let b = generate_test_agents(&config, &mut rng_from_seed("swarm")).unwrap();
        let states_a: Vec<CartesianState> = a.iter().map(|x| x.state).collect();
        let states_b: Vec<CartesianState> = b.iter().map(|x| x.state).collect();
        assert_eq!(states_a, states_b);
        assert_eq!(a[0].id, "T001");
        assert_eq!(a[4].id, "T005");
        for agent in &a {
            let altitude = agent.state.radius() - EARTH_RADIUS;
            assert!((390_000.0..=610_000.0).contains(&altitude));
        }
    }
}
