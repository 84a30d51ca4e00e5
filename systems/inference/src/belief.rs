//! Probability distributions over chaser positions.

use std::collections::BTreeMap;

use grid_chase_core::{CellCoord, GridWorld};

use crate::model::transition_targets;

/// Immutable probability distribution over legal cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Belief {
    weights: BTreeMap<CellCoord, f64>,
}

impl Belief {
    pub(crate) fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (CellCoord, f64)>,
    {
        let mut weights = BTreeMap::new();
        for (cell, weight) in pairs {
            *weights.entry(cell).or_insert(0.0) += weight;
        }
        Self { weights }
    }

    /// Probability assigned to `cell`; zero for cells outside the support.
    #[must_use]
    pub fn probability(&self, cell: CellCoord) -> f64 {
        self.weights.get(&cell).copied().unwrap_or(0.0)
    }

    /// Total mass; one for every distribution handed out by a filter.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Cells and probabilities, ordered by cell.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, f64)> + '_ {
        self.weights.iter().map(|(cell, weight)| (*cell, *weight))
    }

    /// Cell holding the largest probability; the first such cell on ties.
    #[must_use]
    pub fn most_likely(&self) -> Option<CellCoord> {
        self.iter()
            .fold(None, |best: Option<(CellCoord, f64)>, (cell, weight)| match best {
                Some((_, top)) if top >= weight => best,
                _ => Some((cell, weight)),
            })
            .map(|(cell, _)| cell)
    }

    /// Largest absolute per-cell difference between two distributions.
    #[must_use]
    pub fn max_difference(&self, other: &Belief) -> f64 {
        self.weights
            .keys()
            .chain(other.weights.keys())
            .map(|cell| (self.probability(*cell) - other.probability(*cell)).abs())
            .fold(0.0, f64::max)
    }

    /// Row-major `height x width` probability grid for display.
    #[must_use]
    pub fn heatmap(&self, grid: &GridWorld) -> Vec<Vec<f64>> {
        let width = usize::try_from(grid.width()).unwrap_or(0);
        let height = usize::try_from(grid.height()).unwrap_or(0);
        let mut heat = vec![vec![0.0; width]; height];
        for (cell, weight) in self.iter() {
            let (Ok(column), Ok(row)) = (usize::try_from(cell.column()), usize::try_from(cell.row()))
            else {
                continue;
            };
            if let Some(slot) = heat.get_mut(row).and_then(|line| line.get_mut(column)) {
                *slot = weight;
            }
        }
        heat
    }
}

/// Legal positions of a grid with their transition tables precomputed.
#[derive(Clone, Debug)]
pub(crate) struct Support {
    cells: Vec<CellCoord>,
    transitions: Vec<Vec<usize>>,
}

impl Support {
    pub(crate) fn new(grid: &GridWorld, allow_stay: bool) -> Self {
        let cells = grid.legal_positions();
        let mut slots = vec![None; grid.cell_count()];
        for (position, cell) in cells.iter().enumerate() {
            if let Some(index) = grid.index(*cell) {
                slots[index] = Some(position);
            }
        }

        let transitions = cells
            .iter()
            .map(|cell| {
                transition_targets(grid, *cell, allow_stay)
                    .into_iter()
                    .filter_map(|target| grid.index(target).and_then(|index| slots[index]))
                    .collect()
            })
            .collect();

        Self { cells, transitions }
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn cell(&self, position: usize) -> CellCoord {
        self.cells[position]
    }

    pub(crate) fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Successor positions of `position`; never empty.
    pub(crate) fn transitions(&self, position: usize) -> &[usize] {
        &self.transitions[position]
    }

    /// Normalised histogram of `positions`.
    pub(crate) fn histogram<I>(&self, positions: I) -> Belief
    where
        I: IntoIterator<Item = usize>,
    {
        let mut counts = vec![0usize; self.cells.len()];
        let mut total = 0usize;
        for position in positions {
            counts[position] += 1;
            total += 1;
        }
        if total == 0 {
            return Belief::default();
        }
        Belief::from_pairs(
            self.cells
                .iter()
                .zip(counts)
                .filter(|(_, count)| *count > 0)
                .map(|(cell, count)| (*cell, count as f64 / total as f64)),
        )
    }
}
