#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Chase engines.
//!
//! This crate defines the leaf vocabulary every engine speaks: cell
//! coordinates, movement directions, the immutable [`GridWorld`] maze and the
//! tuning records consumed by evaluation and inference. Engines never read
//! ambient state; every knob arrives as an explicit value defined here.

use std::fmt;

use serde::{Deserialize, Serialize};

mod grid;

pub use grid::{GridError, GridWorld};

/// Location of a single grid cell expressed as column and row coordinates.
///
/// The column grows to the east and the row grows to the south, so the origin
/// is the top-left cell of the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell reached by travelling one step in `direction`.
    ///
    /// Returns `None` when the step would leave the non-negative quadrant.
    /// Upper bounds are the grid's concern, not the coordinate's.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::North => self
                .row
                .checked_sub(1)
                .map(|row| CellCoord::new(self.column, row)),
            Direction::East => self
                .column
                .checked_add(1)
                .map(|column| CellCoord::new(column, self.row)),
            Direction::South => self
                .row
                .checked_add(1)
                .map(|row| CellCoord::new(self.column, row)),
            Direction::West => self
                .column
                .checked_sub(1)
                .map(|column| CellCoord::new(column, self.row)),
            Direction::Stop => Some(self),
        }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Movement directions available to agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward decreasing column indices.
    West,
    /// Remaining in place.
    Stop,
}

impl Direction {
    /// Cardinal directions in the canonical expansion order used by every engine.
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction that leads from `from` to the adjacent cell `to`.
    ///
    /// Identical cells map to [`Direction::Stop`]; cells that are not
    /// 4-connected neighbours yield `None`.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Direction> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());

        match column_diff + row_diff {
            0 => Some(Direction::Stop),
            1 if column_diff == 1 => {
                if to.column() > from.column() {
                    Some(Direction::East)
                } else {
                    Some(Direction::West)
                }
            }
            1 => {
                if to.row() > from.row() {
                    Some(Direction::South)
                } else {
                    Some(Direction::North)
                }
            }
            _ => None,
        }
    }

    /// Human readable label used by logs and text displays.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
            Direction::Stop => "Stop",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Single agent action: a labelled direction plus the cell it leads to.
///
/// Game logic only ever consults [`Move::destination`]; the direction exists
/// for display and logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    direction: Direction,
    destination: CellCoord,
}

impl Move {
    /// Creates a move travelling in `direction` that ends on `destination`.
    #[must_use]
    pub const fn new(direction: Direction, destination: CellCoord) -> Self {
        Self {
            direction,
            destination,
        }
    }

    /// Move that keeps the agent on `cell`.
    #[must_use]
    pub const fn stop(cell: CellCoord) -> Self {
        Self::new(Direction::Stop, cell)
    }

    /// Labelled direction of travel.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Cell occupied after the move completes.
    #[must_use]
    pub const fn destination(&self) -> CellCoord {
        self.destination
    }
}

/// Weights steering the seeker's state evaluation function.
///
/// Values are fixed or tuned by hand; they are never learned. Every
/// evaluator receives this record as a parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicWeights {
    /// Multiplier applied to the running game score.
    pub score_weight: f64,
    /// Penalty charged for every food item still on the board.
    pub food_left_penalty: f64,
    /// Reward numerator divided by the distance to the nearest food item.
    pub closest_food_weight: f64,
    /// Penalty charged for every capsule still on the board.
    pub capsule_left_penalty: f64,
    /// Reward numerator divided by the distance to the nearest capsule.
    pub closest_capsule_weight: f64,
    /// Reward numerator divided by the distance to the nearest scared chaser.
    pub scared_ghost_weight: f64,
    /// Flat penalty applied when a threatening chaser is close.
    pub ghost_danger_penalty: f64,
    /// Manhattan distance at or below which a threatening chaser is "close".
    pub ghost_danger_threshold: u32,
    /// Penalty scale for stepping onto recently visited cells.
    pub revisit_penalty: f64,
}

impl Default for HeuristicWeights {
    fn default() -> Self {
        Self {
            score_weight: 1.0,
            food_left_penalty: 5_000.0,
            closest_food_weight: 120.0,
            capsule_left_penalty: 800.0,
            closest_capsule_weight: 1_500.0,
            scared_ghost_weight: 1_200.0,
            ghost_danger_penalty: 2_000.0,
            ghost_danger_threshold: 2,
            revisit_penalty: 5_000.0,
        }
    }
}

/// Tuning knobs for the observation and transition models of the filters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Number of particles maintained by particle-based filters.
    pub particle_count: usize,
    /// Exponential decay rate λ applied to the reading error.
    pub observation_lambda: f64,
    /// Largest reading error considered possible; larger errors have zero likelihood.
    pub noise_range: u32,
    /// Whether the transition model lets a chaser remain in place.
    pub allow_stay: bool,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            particle_count: 1_000,
            observation_lambda: 0.3,
            noise_range: 7,
            allow_stay: true,
        }
    }
}
