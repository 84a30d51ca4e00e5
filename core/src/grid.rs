//! Immutable maze description shared by every engine.

use thiserror::Error;

use crate::{CellCoord, Direction, Move};

/// Reasons a [`GridWorld`] cannot be constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// Width or height was zero.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    ZeroDimension {
        /// Requested number of columns.
        width: u32,
        /// Requested number of rows.
        height: u32,
    },
    /// A wall was declared outside the grid bounds.
    #[error("wall {0} lies outside the grid")]
    WallOutOfBounds(CellCoord),
}

/// Static maze: dimensions plus a dense wall mask stored in row-major order.
///
/// A cell is *legal* when it lies inside the bounds and is not a wall. Legal
/// moves only ever connect 4-adjacent legal cells; diagonal travel and an
/// implicit "stay" are never produced here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridWorld {
    width: u32,
    height: u32,
    walls: Vec<bool>,
}

impl GridWorld {
    /// Builds a grid of the given size with the provided wall cells.
    pub fn new<I>(width: u32, height: u32, walls: I) -> Result<Self, GridError>
    where
        I: IntoIterator<Item = CellCoord>,
    {
        if width == 0 || height == 0 {
            return Err(GridError::ZeroDimension { width, height });
        }

        let cell_count = usize::try_from(u64::from(width) * u64::from(height))
            .map_err(|_| GridError::ZeroDimension { width, height })?;
        let mut grid = Self {
            width,
            height,
            walls: vec![false; cell_count],
        };

        for wall in walls {
            let index = grid.index(wall).ok_or(GridError::WallOutOfBounds(wall))?;
            grid.walls[index] = true;
        }

        Ok(grid)
    }

    /// Builds a grid without any interior walls.
    pub fn open(width: u32, height: u32) -> Result<Self, GridError> {
        Self::new(width, height, std::iter::empty())
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells, walls included.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.walls.len()
    }

    /// Reports whether the cell lies within the grid bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.width && cell.row() < self.height
    }

    /// Reports whether the cell is a wall. Out-of-bounds cells are not walls.
    #[must_use]
    pub fn is_wall(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.walls.get(index).copied())
            .unwrap_or(false)
    }

    /// Reports whether an agent may occupy the cell.
    #[must_use]
    pub fn is_legal(&self, cell: CellCoord) -> bool {
        self.index(cell)
            .and_then(|index| self.walls.get(index).copied())
            .map_or(false, |wall| !wall)
    }

    /// Iterator over every wall cell in row-major order.
    pub fn walls(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells().filter(|cell| self.is_wall(*cell))
    }

    /// Every legal cell in row-major order.
    #[must_use]
    pub fn legal_positions(&self) -> Vec<CellCoord> {
        self.cells().filter(|cell| self.is_legal(*cell)).collect()
    }

    /// Legal moves out of `cell` in North, East, South, West order.
    ///
    /// Yields nothing when `cell` itself is outside the grid.
    pub fn legal_moves(&self, cell: CellCoord) -> impl Iterator<Item = Move> + '_ {
        let mut candidates = [None; 4];
        let mut count = 0;

        if self.contains(cell) {
            for direction in Direction::CARDINAL {
                let Some(neighbor) = cell.step(direction) else {
                    continue;
                };
                if self.is_legal(neighbor) {
                    candidates[count] = Some(Move::new(direction, neighbor));
                    count += 1;
                }
            }
        }

        candidates.into_iter().take(count).flatten()
    }

    /// Legal 4-connected neighbours of `cell` in North, East, South, West order.
    pub fn neighbors(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
        self.legal_moves(cell).map(|step| step.destination())
    }

    /// Dense row-major index of the cell, if it lies within the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }

        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let width = usize::try_from(self.width).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    fn cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        (0..self.height).flat_map(move |row| (0..self.width).map(move |column| CellCoord::new(column, row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corridor() -> GridWorld {
        // . % .
        // . . .
        GridWorld::new(3, 2, [CellCoord::new(1, 0)]).expect("valid grid")
    }

    #[test]
    fn rejects_zero_dimensions() {
        assert_eq!(
            GridWorld::open(0, 4),
            Err(GridError::ZeroDimension {
                width: 0,
                height: 4
            })
        );
    }

    #[test]
    fn rejects_walls_outside_bounds() {
        let wall = CellCoord::new(3, 0);
        assert_eq!(
            GridWorld::new(3, 2, [wall]),
            Err(GridError::WallOutOfBounds(wall))
        );
    }

    #[test]
    fn legal_moves_follow_canonical_order_and_skip_walls() {
        let grid = corridor();
        let moves: Vec<_> = grid.legal_moves(CellCoord::new(1, 1)).collect();
        assert_eq!(
            moves,
            vec![
                Move::new(Direction::East, CellCoord::new(2, 1)),
                Move::new(Direction::West, CellCoord::new(0, 1)),
            ]
        );
    }

    #[test]
    fn legal_positions_exclude_walls() {
        let grid = corridor();
        let legal = grid.legal_positions();
        assert_eq!(legal.len(), 5);
        assert!(!legal.contains(&CellCoord::new(1, 0)));
        assert_eq!(grid.walls().collect::<Vec<_>>(), vec![CellCoord::new(1, 0)]);
    }

    #[test]
    fn out_of_bounds_cells_are_neither_walls_nor_legal() {
        let grid = corridor();
        let outside = CellCoord::new(7, 7);
        assert!(!grid.is_wall(outside));
        assert!(!grid.is_legal(outside));
        assert_eq!(grid.legal_moves(outside).count(), 0);
    }
}
