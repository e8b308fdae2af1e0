use std::str::FromStr;

use clap::{Arg, ArgAction, Command};
use orbswarm::logging::{LogConfig, LogOutput, init_logging, level_from_verbosity, parse_log_level};
use orbswarm::models::IMovable;
use orbswarm::orbit::{cartesian_to_elements, propagate_kepler};
use orbswarm::scenario::ScenarioConfig;
use orbswarm::simulation::SimulationEngine;

const DEMO_SCENARIO: &str = include_str!("../scenarios/demo_swarm.yaml");

fn main() {
    let matches = Command::new("orbswarm")
        .version(env!("CARGO_PKG_VERSION"))
        .about("軌道群制御シミュレーション (Orbital Swarm Simulation)")
        .long_about(
            "軌道力学と群制御を組み合わせた決定論的シミュレーション\n\
             ケプラー二体伝搬・群挙動・ミッション目標・インパルス噴射をティック単位で統合します。",
        )
        .arg(
            Arg::new("scenario")
                .short('s')
                .long("scenario")
                .value_name("FILE")
                .help("シナリオファイル(.yaml)のパスを指定"),
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(ArgAction::SetTrue)
                .help("シナリオの情報のみ表示して終了")
                .conflicts_with("test"),
        )
        .arg(
            Arg::new("test")
                .short('t')
                .long("test")
                .action(ArgAction::SetTrue)
                .help("デモ群を生成して短いセルフチェックを実行")
                .conflicts_with("info"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)"),
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("TARGET")
                .default_value("console")
                .help("ログ出力先 (console, file, both)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)。未指定時は -v から決定"),
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .value_name("DIR")
                .default_value("logs")
                .help("ログファイルの出力ディレクトリ"),
        )
        .get_matches();

    let verbose_level = matches.get_count("verbose");

    let output = match matches
        .get_one::<String>("log-output")
        .map(|s| LogOutput::from_str(s))
        .unwrap_or(Ok(LogOutput::Console))
    {
        Ok(output) => output,
        Err(e) => {
            eprintln!("エラー: {}", e);
            std::process::exit(2);
        }
    };
    let level = matches
        .get_one::<String>("log-level")
        .map(|s| parse_log_level(s))
        .unwrap_or_else(|| level_from_verbosity(verbose_level.max(1)));
    let log_config = LogConfig {
        level,
        output,
        log_dir: matches
            .get_one::<String>("log-dir")
            .cloned()
            .unwrap_or_else(|| "logs".to_string()),
        ..LogConfig::default()
    };
    let _guard = match init_logging(log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("エラー: ログの初期化に失敗しました: {}", e);
            std::process::exit(1);
        }
    };

    println!("軌道群制御シミュレーション - orbswarm v{}", env!("CARGO_PKG_VERSION"));
    println!();

    if matches.get_flag("test") {
        println!("=== セルフチェックモード ===");
        if let Err(e) = run_self_check(verbose_level) {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if let Some(scenario_path) = matches.get_one::<String>("scenario") {
        match run_scenario(scenario_path, matches.get_flag("info"), verbose_level) {
            Ok(_) => {
                if verbose_level > 0 {
                    println!("シナリオ実行が正常に完了しました。");
                }
            }
            Err(e) => {
                eprintln!("エラー: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        show_default_help();
    }
}

/// 組み込みのデモ群で決定論性・軌道保存性を確認し、短時間実行する
fn run_self_check(verbose_level: u8) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = ScenarioConfig::from_yaml_str(DEMO_SCENARIO)?;

    let mut engine = SimulationEngine::new(scenario.clone(), verbose_level);
    engine.initialize()?;
    println!("デモ群を生成しました: {}機, 目標 {}件", engine.agents.len(), engine.objectives.len());

    let Some(first) = engine.agents.first() else {
        return Err("デモ群にエージェントがありません".into());
    };
    let state = first.get_state();
    let period = cartesian_to_elements(&state)?.period();
    let after_period = propagate_kepler(&state, period)?;
    let radius_error = (after_period.radius() - state.radius()).abs();
    let repeat = propagate_kepler(&state, period)?;
    println!(
        "軌道1周期後の半径誤差: {:.3e} m (決定論性: {})",
        radius_error,
        if repeat == after_period { "OK" } else { "NG" }
    );

    let mut twin = SimulationEngine::new(scenario, 0);
    twin.initialize()?;
    for _ in 0..60 {
        engine.step()?;
        twin.step()?;
    }
    let identical = engine.agents == twin.agents;
    println!(
        "60ステップ実行: 時刻 {:.1}秒, 得点 {}, 同一シード再現性: {}",
        engine.clock.sim_time(),
        engine.score,
        if identical { "OK" } else { "NG" }
    );

    if !identical || repeat != after_period {
        return Err("決定論性チェックに失敗しました".into());
    }
    println!("\nセルフチェックが正常に完了しました！");
    Ok(())
}

/// シナリオファイルを読み込んで実行
fn run_scenario(scenario_path: &str, info_only: bool, verbose_level: u8) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = ScenarioConfig::from_file(scenario_path)?;

    if verbose_level > 0 {
        println!("シナリオファイル読み込み完了: {}", scenario_path);
    }

    if info_only {
        scenario.print_summary();
        return Ok(());
    }

    scenario.print_summary();
    println!();

    let mut simulation = SimulationEngine::new(scenario, verbose_level);
    simulation.initialize()?;
    simulation.run()?;

    let completed = simulation.objectives.iter().filter(|o| o.is_completed()).count();
    println!();
    println!("=== 結果 ===");
    println!("シミュレーション時刻: {:.1}秒", simulation.clock.sim_time());
    println!("達成目標: {}/{}", completed, simulation.objectives.len());
    println!("得点: {}", simulation.score);

    Ok(())
}

fn show_default_help() {
    println!("使用方法:");
    println!("  orbswarm [オプション]");
    println!();
    println!("オプション:");
    println!("  -s, --scenario <FILE>    シナリオファイルを指定して実行");
    println!("  -i, --info               シナリオ情報のみ表示");
    println!("  -t, --test               デモ群でセルフチェックを実行");
    println!("  -v, --verbose            詳細出力 (複数指定で詳細レベル上昇)");
    println!("      --log-output <TARGET> ログ出力先 (console, file, both)");
    println!("      --log-level <LEVEL>  ログレベル");
    println!("      --log-dir <DIR>      ログディレクトリ");
    println!("  -h, --help               このヘルプを表示");
    println!();
    println!("利用可能なシナリオファイル:");
    println!("  scenarios/demo_swarm.yaml      - リング編隊と3種類の目標");
    println!("  scenarios/relay_hold.yaml      - 中継ノード保持の検証用");
    println!();
    println!("例:");
    println!("  orbswarm -s scenarios/demo_swarm.yaml");
    println!("  orbswarm -s scenarios/relay_hold.yaml -vv --log-output both");
    println!("  orbswarm -s scenarios/demo_swarm.yaml -i");
    println!("  orbswarm --test");
}
