#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text layouts describing a grid, its walls and the starting placements.
//!
//! Each line of a layout is one grid row. `%` marks a wall, `.` food, `o` a
//! capsule, `P` the seeker and `G` a chaser; every other character is floor.

use std::collections::BTreeSet;

use grid_chase_core::{CellCoord, GridError, GridWorld};
use grid_chase_world::{Chaser, GameState};
use thiserror::Error;
use tracing::debug;

const WALL: char = '%';
const FOOD: char = '.';
const CAPSULE: char = 'o';
const SEEKER: char = 'P';
const CHASER: char = 'G';

/// Errors raised while parsing layout text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The text contained no rows.
    #[error("layout '{0}' is empty")]
    Empty(String),
    /// No `P` marker was found.
    #[error("layout '{0}' has no seeker start")]
    MissingSeeker(String),
    /// More than one `P` marker was found.
    #[error("layout '{name}' has a second seeker start at {second}")]
    DuplicateSeeker {
        /// Layout name.
        name: String,
        /// Cell of the second marker.
        second: CellCoord,
    },
    /// The dimensions could not form a grid.
    #[error("layout '{name}' does not form a grid: {source}")]
    Grid {
        /// Layout name.
        name: String,
        /// Underlying grid error.
        source: GridError,
    },
}

/// Parsed layout: the static grid plus the initial entity placements.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    name: String,
    grid: GridWorld,
    seeker: CellCoord,
    chasers: Vec<CellCoord>,
    food: BTreeSet<CellCoord>,
    capsules: BTreeSet<CellCoord>,
}

impl Layout {
    /// Parses `text` into a layout called `name`.
    ///
    /// Trailing blank lines are dropped. Rows shorter than the widest row are
    /// padded with floor.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError`] for empty text, a missing or repeated seeker
    /// marker, or dimensions the grid rejects.
    pub fn parse(name: &str, text: &str) -> Result<Self, LayoutError> {
        let mut rows: Vec<&str> = text.lines().map(|line| line.trim_end_matches('\r')).collect();
        while rows.last().is_some_and(|row| row.trim().is_empty()) {
            let _ = rows.pop();
        }
        if rows.is_empty() {
            return Err(LayoutError::Empty(name.to_owned()));
        }

        let mut width = 0u32;
        let mut height = 0u32;
        let mut walls = Vec::new();
        let mut seeker = None;
        let mut chasers = Vec::new();
        let mut food = BTreeSet::new();
        let mut capsules = BTreeSet::new();

        for (row, line) in (0u32..).zip(&rows) {
            height = row + 1;
            for (column, symbol) in (0u32..).zip(line.chars()) {
                width = width.max(column + 1);
                let cell = CellCoord::new(column, row);
                match symbol {
                    WALL => walls.push(cell),
                    FOOD => {
                        let _ = food.insert(cell);
                    }
                    CAPSULE => {
                        let _ = capsules.insert(cell);
                    }
                    SEEKER => {
                        if seeker.replace(cell).is_some() {
                            return Err(LayoutError::DuplicateSeeker {
                                name: name.to_owned(),
                                second: cell,
                            });
                        }
                    }
                    CHASER => chasers.push(cell),
                    _ => {}
                }
            }
        }

        let seeker = seeker.ok_or_else(|| LayoutError::MissingSeeker(name.to_owned()))?;
        let grid = GridWorld::new(width, height, walls).map_err(|source| LayoutError::Grid {
            name: name.to_owned(),
            source,
        })?;

        debug!(
            layout = name,
            width,
            height,
            chasers = chasers.len(),
            food = food.len(),
            capsules = capsules.len(),
            "parsed layout"
        );

        Ok(Self {
            name: name.to_owned(),
            grid,
            seeker,
            chasers,
            food,
            capsules,
        })
    }

    /// Layout name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Static grid.
    #[must_use]
    pub fn grid(&self) -> &GridWorld {
        &self.grid
    }

    /// Seeker start.
    #[must_use]
    pub const fn seeker(&self) -> CellCoord {
        self.seeker
    }

    /// Chaser starts in row-major order.
    #[must_use]
    pub fn chasers(&self) -> &[CellCoord] {
        &self.chasers
    }

    /// Food cells.
    #[must_use]
    pub fn food(&self) -> &BTreeSet<CellCoord> {
        &self.food
    }

    /// Capsule cells.
    #[must_use]
    pub fn capsules(&self) -> &BTreeSet<CellCoord> {
        &self.capsules
    }

    /// Goal used by single-agent search: the first food cell in row-major
    /// order, otherwise the cell one step in from the bottom-left corner.
    #[must_use]
    pub fn search_goal(&self) -> CellCoord {
        self.food
            .iter()
            .min_by_key(|cell| (cell.row(), cell.column()))
            .copied()
            .unwrap_or_else(|| CellCoord::new(1, self.grid.height().saturating_sub(2)))
    }

    /// Opening game snapshot with every chaser threatening.
    #[must_use]
    pub fn initial_state(&self) -> GameState {
        GameState::new(
            self.seeker,
            self.chasers.iter().copied().map(Chaser::new).collect(),
            self.food.iter().copied(),
            self.capsules.iter().copied(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_blank_lines_are_ignored() {
        let layout = Layout::parse("tiny", "%%%\n%P%\n%%%\n\n  \n").expect("valid layout");
        assert_eq!(layout.grid().width(), 3);
        assert_eq!(layout.grid().height(), 3);
    }

    #[test]
    fn ragged_rows_are_padded_with_floor() {
        let layout = Layout::parse("ragged", "%%%%\n%P\n%%%%").expect("valid layout");
        assert_eq!(layout.grid().width(), 4);
        assert!(layout.grid().is_legal(CellCoord::new(2, 1)));
        assert!(layout.grid().is_legal(CellCoord::new(3, 1)));
    }

    #[test]
    fn unknown_symbols_are_floor() {
        let layout = Layout::parse("odd", "P#x1").expect("valid layout");
        assert_eq!(layout.grid().legal_positions().len(), 4);
    }

    #[test]
    fn windows_line_endings_are_accepted() {
        let layout = Layout::parse("crlf", "%%\r\nP.\r\n").expect("valid layout");
        assert_eq!(layout.grid().width(), 2);
        assert_eq!(layout.food().len(), 1);
    }

    #[test]
    fn seeker_marker_must_be_unique() {
        assert_eq!(
            Layout::parse("none", "%.%"),
            Err(LayoutError::MissingSeeker("none".to_owned()))
        );
        assert_eq!(
            Layout::parse("two", "P P"),
            Err(LayoutError::DuplicateSeeker {
                name: "two".to_owned(),
                second: CellCoord::new(2, 0),
            })
        );
        assert_eq!(
            Layout::parse("blank", "\n\n"),
            Err(LayoutError::Empty("blank".to_owned()))
        );
    }
}
