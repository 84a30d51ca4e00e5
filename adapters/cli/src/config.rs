//! TOML configuration shared by every subcommand.

use std::{fs, io, path::Path, path::PathBuf};

use grid_chase_core::{HeuristicWeights, InferenceConfig};
use grid_chase_system_agents::{DecisionProcedure, DEFAULT_DEPTH};
use grid_chase_system_search::SearchAlgorithm;
use grid_chase_world::TURN_LIMIT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Steps simulated by `track` when neither the file nor the flags say otherwise.
pub const DEFAULT_TRACK_STEPS: u32 = 20;

/// Reasons a configuration file cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {}", path.display())]
    Read {
        /// Offending path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not valid configuration TOML.
    #[error("failed to parse config file {}", path.display())]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },
}

/// Complete configuration; every table and key is optional.
///
/// ```toml
/// [weights]
/// food_left_penalty = 4000.0
///
/// [inference]
/// particle_count = 5000
///
/// [game]
/// procedure = "alphabeta"
/// depth = 3
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Evaluation weights handed to every decision procedure.
    pub weights: HeuristicWeights,
    /// Observation and transition settings for the filters.
    pub inference: InferenceConfig,
    /// Settings for `play`.
    pub game: GameConfig,
    /// Settings for `search`.
    pub search: SearchConfig,
    /// Settings for `track`.
    pub track: TrackConfig,
}

impl Config {
    /// Reads and parses the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents are not valid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Game settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Procedure steering the seeker.
    pub procedure: DecisionProcedure,
    /// Search depth in full rounds for game-tree procedures.
    pub depth: u32,
    /// Turn budget for a session.
    pub max_turns: u32,
    /// Pause between rendered frames in milliseconds.
    pub delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            procedure: DecisionProcedure::default(),
            depth: DEFAULT_DEPTH,
            max_turns: TURN_LIMIT,
            delay_ms: 0,
        }
    }
}

/// Search settings; without an algorithm every algorithm runs in turn.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Algorithm to run.
    pub algorithm: Option<SearchAlgorithm>,
}

/// Tracking settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackConfig {
    /// Observe/elapse rounds to simulate.
    pub steps: u32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            steps: DEFAULT_TRACK_STEPS,
        }
    }
}
