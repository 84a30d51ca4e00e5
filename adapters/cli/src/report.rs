//! Output records written by the stepping loop.

use std::io::Write;

use anyhow::Result;
use grid_chase_core::CellCoord;
use grid_chase_system_agents::DecisionProcedure;
use grid_chase_system_search::{SearchAlgorithm, SearchSnapshot, SearchStatus};
use grid_chase_world::{GameState, GameStatus};
use serde::Serialize;

use crate::{FilterKind, OutputFormat};

/// One line of JSON output, tagged by `kind`.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Record<'a> {
    SearchFrame {
        algorithm: SearchAlgorithm,
        snapshot: &'a SearchSnapshot,
    },
    SearchSummary {
        layout: &'a str,
        algorithm: SearchAlgorithm,
        status: SearchStatus,
        path_length: Option<usize>,
        expansions: usize,
        path: &'a [CellCoord],
    },
    GameFrame {
        state: &'a GameState,
    },
    GameSummary {
        layout: &'a str,
        procedure: DecisionProcedure,
        depth: u32,
        turns: u32,
        score: i64,
        status: GameStatus,
    },
    TrackFrame {
        step: u32,
        seeker: CellCoord,
        readings: &'a [Option<u32>],
        chasers: &'a [CellCoord],
        estimates: Vec<Option<CellCoord>>,
    },
    TrackSummary {
        layout: &'a str,
        filter: FilterKind,
        steps: u32,
        errors: &'a [Option<u32>],
    },
}

/// Writes `record` as a JSON line, or the lazily rendered `text` block.
pub(crate) fn emit<W>(
    out: &mut W,
    format: OutputFormat,
    record: &Record<'_>,
    text: impl FnOnce() -> String,
) -> Result<()>
where
    W: Write + ?Sized,
{
    match format {
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(record)?)?,
        OutputFormat::Text => writeln!(out, "{}", text())?,
    }
    Ok(())
}
