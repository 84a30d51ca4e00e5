use std::{fs, path::PathBuf, process};

use clap::Parser;
use grid_chase_cli::{run, Cli, ConfigError};
use serde_json::Value;

fn layout(name: &str) -> String {
    format!("{}/../../layouts/{name}.lay", env!("CARGO_MANIFEST_DIR"))
}

fn invoke(arguments: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("grid-chase").chain(arguments.iter().copied()))?;
    let mut out = Vec::new();
    run(&cli, &mut out)?;
    Ok(String::from_utf8(out)?)
}

fn json_lines(output: &str) -> Vec<Value> {
    output
        .lines()
        .map(|line| serde_json::from_str(line).expect("every line is JSON"))
        .collect()
}

fn of_kind<'a>(records: &'a [Value], kind: &str) -> Vec<&'a Value> {
    records.iter().filter(|record| record["kind"] == kind).collect()
}

#[test]
fn breadth_first_search_solves_the_tiny_maze() {
    let maze = layout("tinyMaze");
    let output = invoke(&["search", &maze, "--algorithm", "bfs", "--format", "json"])
        .expect("search runs");
    let records = json_lines(&output);

    assert_eq!(records.len(), 1);
    let summary = &records[0];
    assert_eq!(summary["kind"], "search_summary");
    assert_eq!(summary["algorithm"], "bfs");
    assert_eq!(summary["status"], "found");
    assert_eq!(summary["path_length"], 10);
    assert_eq!(summary["path"].as_array().map(Vec::len), Some(11));
}

#[test]
fn every_algorithm_reports_in_turn() {
    let maze = layout("tinyMaze");
    let output = invoke(&["search", &maze, "--format", "json"]).expect("search runs");
    let records = json_lines(&output);

    let algorithms: Vec<&str> = records
        .iter()
        .filter_map(|record| record["algorithm"].as_str())
        .collect();
    assert_eq!(algorithms, vec!["dfs", "bfs", "ucs", "astar"]);
    for record in &records[1..] {
        assert_eq!(record["path_length"], 10);
    }
}

#[test]
fn frames_follow_every_expansion() {
    let maze = layout("tinyMaze");
    let output = invoke(&[
        "search",
        &maze,
        "--algorithm",
        "astar",
        "--frames",
        "--format",
        "json",
    ])
    .expect("search runs");
    let records = json_lines(&output);

    let frames = of_kind(&records, "search_frame");
    let summary = of_kind(&records, "search_summary");
    assert_eq!(summary.len(), 1);
    assert_eq!(Some(frames.len() as u64), summary[0]["expansions"].as_u64());
    assert_eq!(frames.last().map(|frame| &frame["snapshot"]["status"]), Some(&Value::from("found")));
}

#[test]
fn text_search_draws_the_path() {
    let maze = layout("tinyMaze");
    let output = invoke(&["search", &maze, "--algorithm", "ucs"]).expect("search runs");
    assert!(output.starts_with("ucs on tinyMaze: Found, path length 10"));
    assert_eq!(output.matches('*').count(), 9);
}

#[test]
fn seeded_games_replay_identically() {
    let board = layout("testClassic");
    let arguments = [
        "play",
        &board,
        "--procedure",
        "reflex",
        "--max-turns",
        "60",
        "--seed",
        "17",
        "--format",
        "json",
    ];
    let first = invoke(&arguments).expect("game runs");
    let second = invoke(&arguments).expect("game runs");
    assert_eq!(first, second);

    let records = json_lines(&first);
    let frames = of_kind(&records, "game_frame");
    let summary = of_kind(&records, "game_summary");
    assert_eq!(summary.len(), 1);
    let turns = summary[0]["turns"].as_u64().expect("turn count");
    assert!(turns <= 60);
    assert_eq!(frames.len() as u64, turns + 1);
    assert_eq!(summary[0]["procedure"], "reflex");
}

#[test]
fn game_tree_procedures_play_to_completion() {
    let board = layout("testClassic");
    for procedure in ["minimax", "alphabeta", "expectimax"] {
        let output = invoke(&[
            "play",
            &board,
            "--procedure",
            procedure,
            "--depth",
            "1",
            "--max-turns",
            "15",
        ])
        .expect("game runs");
        let summary = output.lines().last().expect("summary line");
        assert!(summary.starts_with(&format!("{procedure} (depth 1) on testClassic")), "{summary}");
    }
}

#[test]
fn every_filter_tracks_both_chasers() {
    let arena = layout("trackingArena");
    for filter in ["exact", "particle", "joint"] {
        let output = invoke(&[
            "track", &arena, "--filter", filter, "--steps", "6", "--format", "json", "--seed", "4",
        ])
        .expect("tracking runs");
        let records = json_lines(&output);

        let frames = of_kind(&records, "track_frame");
        assert_eq!(frames.len(), 6, "{filter}");
        for frame in frames {
            assert_eq!(frame["estimates"].as_array().map(Vec::len), Some(2), "{filter}");
            assert_eq!(frame["readings"].as_array().map(Vec::len), Some(2), "{filter}");
        }
        let summary = of_kind(&records, "track_summary");
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0]["filter"], filter);
    }
}

#[test]
fn tracking_needs_a_chaser() {
    let maze = layout("tinyMaze");
    let error = invoke(&["track", &maze]).expect_err("no chasers");
    assert!(error.to_string().contains("no chasers"));
}

#[test]
fn config_file_selects_the_algorithm() {
    let path: PathBuf = std::env::temp_dir().join(format!("grid-chase-{}.toml", process::id()));
    fs::write(&path, "[search]\nalgorithm = \"astar\"\n").expect("temp file writable");
    let config = path.to_string_lossy().into_owned();
    let maze = layout("tinyMaze");

    let output = invoke(&["search", &maze, "--config", &config, "--format", "json"]);
    let _ = fs::remove_file(&path);

    let records = json_lines(&output.expect("search runs"));
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["algorithm"], "astar");
}

#[test]
fn missing_config_file_is_reported() {
    let maze = layout("tinyMaze");
    let error = invoke(&["search", &maze, "--config", "/nonexistent/grid-chase.toml"])
        .expect_err("config missing");
    assert!(matches!(
        error.downcast_ref::<ConfigError>(),
        Some(ConfigError::Read { .. })
    ));
}
