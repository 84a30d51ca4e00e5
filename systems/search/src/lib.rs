#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Step-by-step path search over a [`GridWorld`].
//!
//! [`search`] validates the endpoints and returns a [`SearchRun`], a lazy
//! iterator that performs exactly one node expansion per call to `next` and
//! yields the resulting [`SearchSnapshot`]. Callers drive the run at whatever
//! pace they like and simply drop it to cancel.

use std::{fmt, str::FromStr};

use grid_chase_core::{CellCoord, GridWorld};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

mod frontier;

use frontier::{Entry, Frontier};

/// Frontier discipline used by a search run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchAlgorithm {
    /// Depth-first search; the most recently discovered cell is expanded first.
    Dfs,
    /// Breadth-first search; cells are expanded in discovery order.
    Bfs,
    /// Uniform-cost search with unit step costs.
    Ucs,
    /// A* ordered by path cost plus Manhattan distance to the goal.
    #[serde(rename = "astar")]
    AStar,
}

impl SearchAlgorithm {
    /// Every algorithm, in the order used for side-by-side comparisons.
    pub const ALL: [SearchAlgorithm; 4] = [
        SearchAlgorithm::Dfs,
        SearchAlgorithm::Bfs,
        SearchAlgorithm::Ucs,
        SearchAlgorithm::AStar,
    ];

    /// Short lowercase name accepted by [`FromStr`].
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            SearchAlgorithm::Dfs => "dfs",
            SearchAlgorithm::Bfs => "bfs",
            SearchAlgorithm::Ucs => "ucs",
            SearchAlgorithm::AStar => "astar",
        }
    }

    /// Reports whether the algorithm guarantees a shortest path.
    #[must_use]
    pub const fn is_optimal(self) -> bool {
        !matches!(self, SearchAlgorithm::Dfs)
    }

    fn frontier(self) -> Frontier {
        match self {
            SearchAlgorithm::Dfs => Frontier::stack(),
            SearchAlgorithm::Bfs => Frontier::queue(),
            SearchAlgorithm::Ucs | SearchAlgorithm::AStar => Frontier::priority(),
        }
    }

    const fn tracks_cost(self) -> bool {
        matches!(self, SearchAlgorithm::Ucs | SearchAlgorithm::AStar)
    }
}

impl fmt::Display for SearchAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SearchAlgorithm {
    type Err = SearchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        SearchAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.label() == normalized)
            .ok_or_else(|| SearchError::UnknownAlgorithm(value.to_owned()))
    }
}

/// Errors reported before a search run starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// The start cell is a wall or lies outside the grid.
    #[error("start cell {0} is not a legal position")]
    StartNotLegal(CellCoord),
    /// The goal cell is a wall or lies outside the grid.
    #[error("goal cell {0} is not a legal position")]
    GoalNotLegal(CellCoord),
    /// The algorithm name is not one of dfs, bfs, ucs or astar.
    #[error("unknown search algorithm `{0}` (expected dfs, bfs, ucs or astar)")]
    UnknownAlgorithm(String),
}

/// One expanded cell and its 0-based position in the expansion order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expansion {
    /// Cell that was expanded.
    pub cell: CellCoord,
    /// Position of the expansion within the run.
    pub order: usize,
}

/// Progress of a search run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchStatus {
    /// More expansions remain.
    Running,
    /// The goal was expanded and the path is available.
    Found,
    /// The frontier ran dry before the goal was reached.
    Exhausted,
}

/// Observable state of a search run after a number of expansions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSnapshot {
    algorithm: SearchAlgorithm,
    expansions: Vec<Expansion>,
    path: Vec<CellCoord>,
    status: SearchStatus,
}

impl SearchSnapshot {
    fn empty(algorithm: SearchAlgorithm) -> Self {
        Self {
            algorithm,
            expansions: Vec::new(),
            path: Vec::new(),
            status: SearchStatus::Running,
        }
    }

    /// Algorithm that produced the snapshot.
    #[must_use]
    pub const fn algorithm(&self) -> SearchAlgorithm {
        self.algorithm
    }

    /// Expansions in the order they happened.
    #[must_use]
    pub fn expansions(&self) -> &[Expansion] {
        &self.expansions
    }

    /// Cells expanded so far, in expansion order.
    pub fn visited(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.expansions.iter().map(|expansion| expansion.cell)
    }

    /// Start-to-goal path; empty until the goal is found.
    #[must_use]
    pub fn path(&self) -> &[CellCoord] {
        &self.path
    }

    /// Number of moves along the path, if one was found.
    #[must_use]
    pub fn path_length(&self) -> Option<usize> {
        self.path.len().checked_sub(1)
    }

    /// Number of expansions performed.
    #[must_use]
    pub fn total_expansions(&self) -> usize {
        self.expansions.len()
    }

    /// Progress of the run at the time of the snapshot.
    #[must_use]
    pub const fn status(&self) -> SearchStatus {
        self.status
    }

    /// Reports whether the run has nothing left to do.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status != SearchStatus::Running
    }
}

/// Lazy search run yielding one snapshot per expansion.
///
/// The run is finite and cannot be restarted; call [`search`] again for a
/// fresh one.
#[derive(Debug)]
pub struct SearchRun<'a> {
    grid: &'a GridWorld,
    goal: CellCoord,
    algorithm: SearchAlgorithm,
    frontier: Frontier,
    visited: Vec<bool>,
    parents: Vec<Option<CellCoord>>,
    best_cost: Vec<Option<u32>>,
    snapshot: SearchSnapshot,
}

/// Starts a search from `start` toward `goal` on `grid`.
///
/// # Errors
///
/// Returns [`SearchError::StartNotLegal`] or [`SearchError::GoalNotLegal`]
/// when either endpoint is a wall or lies outside the grid.
pub fn search(
    grid: &GridWorld,
    start: CellCoord,
    goal: CellCoord,
    algorithm: SearchAlgorithm,
) -> Result<SearchRun<'_>, SearchError> {
    if !grid.is_legal(start) {
        return Err(SearchError::StartNotLegal(start));
    }
    if !grid.is_legal(goal) {
        return Err(SearchError::GoalNotLegal(goal));
    }

    let cells = grid.cell_count();
    let mut run = SearchRun {
        grid,
        goal,
        algorithm,
        frontier: algorithm.frontier(),
        visited: vec![false; cells],
        parents: vec![None; cells],
        best_cost: vec![None; cells],
        snapshot: SearchSnapshot::empty(algorithm),
    };
    run.enqueue(Entry {
        cell: start,
        parent: None,
        cost: 0,
    });
    Ok(run)
}

impl SearchRun<'_> {
    /// Drives the run to completion and returns the final snapshot.
    #[must_use]
    pub fn finish(mut self) -> SearchSnapshot {
        while self.next().is_some() {}
        self.snapshot
    }

    /// Algorithm driving this run.
    #[must_use]
    pub const fn algorithm(&self) -> SearchAlgorithm {
        self.algorithm
    }

    fn is_visited(&self, cell: CellCoord) -> bool {
        self.grid
            .index(cell)
            .and_then(|index| self.visited.get(index).copied())
            .unwrap_or(true)
    }

    fn enqueue(&mut self, entry: Entry) {
        if self.algorithm.tracks_cost() {
            let Some(index) = self.grid.index(entry.cell) else {
                return;
            };
            if self.best_cost[index].map_or(false, |best| best <= entry.cost) {
                return;
            }
            self.best_cost[index] = Some(entry.cost);
        }

        let priority = match self.algorithm {
            SearchAlgorithm::AStar => entry
                .cost
                .saturating_add(entry.cell.manhattan_distance(self.goal)),
            _ => entry.cost,
        };
        self.frontier.push(entry, priority);
    }

    fn discard_stale(&mut self) {
        while let Some(entry) = self.frontier.peek() {
            if !self.is_visited(entry.cell) {
                break;
            }
            let _ = self.frontier.pop();
        }
    }

    fn expand(&mut self, entry: Entry) {
        let Some(index) = self.grid.index(entry.cell) else {
            return;
        };
        self.visited[index] = true;
        self.parents[index] = entry.parent;

        let order = self.snapshot.expansions.len();
        self.snapshot.expansions.push(Expansion {
            cell: entry.cell,
            order,
        });
        trace!(algorithm = %self.algorithm, cell = %entry.cell, order, "expanded cell");

        if entry.cell == self.goal {
            self.snapshot.path = self.trace_path();
            self.snapshot.status = SearchStatus::Found;
            debug!(
                algorithm = %self.algorithm,
                expansions = self.snapshot.expansions.len(),
                length = self.snapshot.path.len().saturating_sub(1),
                "search reached goal"
            );
            return;
        }

        let neighbors: Vec<CellCoord> = self.grid.neighbors(entry.cell).collect();
        for neighbor in neighbors {
            if self.is_visited(neighbor) {
                continue;
            }
            self.enqueue(Entry {
                cell: neighbor,
                parent: Some(entry.cell),
                cost: entry.cost.saturating_add(1),
            });
        }

        self.discard_stale();
        if self.frontier.peek().is_none() {
            self.snapshot.status = SearchStatus::Exhausted;
            debug!(
                algorithm = %self.algorithm,
                expansions = self.snapshot.expansions.len(),
                "search exhausted the frontier"
            );
        }
    }

    fn trace_path(&self) -> Vec<CellCoord> {
        let mut path = vec![self.goal];
        let mut cursor = self.goal;
        while let Some(parent) = self
            .grid
            .index(cursor)
            .and_then(|index| self.parents.get(index).copied().flatten())
        {
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        path
    }
}

impl Iterator for SearchRun<'_> {
    type Item = SearchSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.snapshot.is_finished() {
            return None;
        }

        self.discard_stale();
        let Some(entry) = self.frontier.pop() else {
            self.snapshot.status = SearchStatus::Exhausted;
            return None;
        };
        self.expand(entry);
        Some(self.snapshot.clone())
    }
}
