#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line stepping loop for Grid Chase.
//!
//! Each subcommand loads a layout file, steps one engine to completion and
//! writes either ASCII frames or JSON lines. Every random choice flows from
//! the `--seed` flag, so identical invocations print identical output.

use std::{io::Write, path::PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use grid_chase_system_agents::DecisionProcedure;
use grid_chase_system_search::SearchAlgorithm;
use serde::Serialize;

mod commands;
mod config;
mod render;
mod report;
mod tracking;

pub use config::{
    Config, ConfigError, GameConfig, SearchConfig, TrackConfig, DEFAULT_TRACK_STEPS,
};

/// Top-level arguments.
#[derive(Debug, Parser)]
#[command(name = "grid-chase", version, about = "Search, play and track on grid layouts")]
pub struct Cli {
    /// TOML file with weights, inference and game settings.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Seed for every random choice.
    #[arg(long, global = true, default_value_t = 0)]
    pub seed: u64,
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    /// Tracing filter directive; falls back to `RUST_LOG`, then `warn`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    /// Engine to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands, one per engine.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find a path from the seeker to the layout's goal.
    Search(SearchArgs),
    /// Play a game with the seeker agent.
    Play(PlayArgs),
    /// Track hidden chasers from noisy distance readings.
    Track(TrackArgs),
}

/// Arguments of `search`.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Layout file.
    pub layout: PathBuf,
    /// Algorithm to run; every algorithm when omitted.
    #[arg(long, value_enum)]
    pub algorithm: Option<AlgorithmChoice>,
    /// Print a frame after every expansion.
    #[arg(long)]
    pub frames: bool,
}

/// Arguments of `play`.
#[derive(Debug, Args)]
pub struct PlayArgs {
    /// Layout file.
    pub layout: PathBuf,
    /// Decision procedure: reflex, minimax, alphabeta or expectimax.
    #[arg(long)]
    pub procedure: Option<DecisionProcedure>,
    /// Search depth in full rounds.
    #[arg(long)]
    pub depth: Option<u32>,
    /// Turn budget.
    #[arg(long)]
    pub max_turns: Option<u32>,
    /// Pause between frames in milliseconds.
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

/// Arguments of `track`.
#[derive(Debug, Args)]
pub struct TrackArgs {
    /// Layout file; needs at least one chaser.
    pub layout: PathBuf,
    /// Filter used for tracking.
    #[arg(long, value_enum, default_value_t = FilterKind::Exact)]
    pub filter: FilterKind,
    /// Observe/elapse rounds to simulate.
    #[arg(long)]
    pub steps: Option<u32>,
}

/// Output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII frames.
    Text,
    /// One JSON object per line.
    Json,
}

/// Algorithm selection for `search`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmChoice {
    /// Depth-first search.
    Dfs,
    /// Breadth-first search.
    Bfs,
    /// Uniform-cost search.
    Ucs,
    /// A* with the Manhattan heuristic.
    Astar,
    /// Every algorithm in turn.
    All,
}

impl AlgorithmChoice {
    /// Algorithms covered by the choice.
    #[must_use]
    pub fn algorithms(self) -> Vec<SearchAlgorithm> {
        match self {
            Self::Dfs => vec![SearchAlgorithm::Dfs],
            Self::Bfs => vec![SearchAlgorithm::Bfs],
            Self::Ucs => vec![SearchAlgorithm::Ucs],
            Self::Astar => vec![SearchAlgorithm::AStar],
            Self::All => SearchAlgorithm::ALL.to_vec(),
        }
    }
}

/// Filter selection for `track`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// One exact filter per chaser.
    Exact,
    /// One particle filter per chaser.
    Particle,
    /// A single joint particle filter over every chaser.
    Joint,
}

/// Runs the parsed command line, writing frames to `out`.
///
/// # Errors
///
/// Fails when the configuration or layout cannot be loaded, or when the
/// layout does not suit the command.
pub fn run<W>(cli: &Cli, out: &mut W) -> Result<()>
where
    W: Write + ?Sized,
{
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match &cli.command {
        Command::Search(args) => commands::run_search(args, &config, cli.format, out),
        Command::Play(args) => commands::run_play(args, &config, cli.seed, cli.format, out),
        Command::Track(args) => commands::run_track(args, &config, cli.seed, cli.format, out),
    }
}
