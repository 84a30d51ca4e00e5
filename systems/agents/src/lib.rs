#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeker decision procedures for the Grid Chase game.
//!
//! A [`SeekerAgent`] turns a [`GameState`] into the seeker's next [`Move`]
//! using one of four [`DecisionProcedure`]s, then lets its
//! [`OscillationGuard`] veto moves that keep bouncing between two cells.
//! [`GameSession`] couples an agent with the chaser policy to play whole
//! games one turn at a time.

use std::{fmt, str::FromStr};

use grid_chase_core::{GridWorld, HeuristicWeights, Move};
use grid_chase_world::{GameState, SEEKER};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod evaluation;
mod oscillation;
mod reflex;
mod session;
mod tree;

pub use evaluation::{evaluate_reflex_move, evaluate_state};
pub use oscillation::{OscillationGuard, HISTORY_LENGTH, STREAK_LIMIT};
pub use session::GameSession;
pub use tree::{GameTree, TreeSearch};

/// Search depth, in full rounds, used when none is configured.
pub const DEFAULT_DEPTH: u32 = 2;
/// Value nudge against moving straight back to the previous cell.
pub const BACKTRACK_NUDGE: f64 = 0.0001;
/// Value nudge against moving onto any recently visited cell.
pub const REVISIT_NUDGE: f64 = 0.00005;

/// Procedure the seeker uses to pick its move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionProcedure {
    /// One-ply greedy evaluation with random tie-breaking.
    #[default]
    Reflex,
    /// Full-width adversarial search.
    Minimax,
    /// Adversarial search with alpha-beta pruning.
    #[serde(rename = "alphabeta")]
    AlphaBeta,
    /// Search treating chasers as uniformly random.
    Expectimax,
}

impl DecisionProcedure {
    /// Every procedure in presentation order.
    pub const ALL: [DecisionProcedure; 4] = [
        DecisionProcedure::Reflex,
        DecisionProcedure::Minimax,
        DecisionProcedure::AlphaBeta,
        DecisionProcedure::Expectimax,
    ];

    /// Lowercase name accepted by [`FromStr`].
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            DecisionProcedure::Reflex => "reflex",
            DecisionProcedure::Minimax => "minimax",
            DecisionProcedure::AlphaBeta => "alphabeta",
            DecisionProcedure::Expectimax => "expectimax",
        }
    }

    /// Game-tree backup rule, or `None` for the one-ply reflex procedure.
    #[must_use]
    pub const fn tree_search(self) -> Option<TreeSearch> {
        match self {
            DecisionProcedure::Reflex => None,
            DecisionProcedure::Minimax => Some(TreeSearch::Minimax),
            DecisionProcedure::AlphaBeta => Some(TreeSearch::AlphaBeta),
            DecisionProcedure::Expectimax => Some(TreeSearch::Expectimax),
        }
    }
}

impl fmt::Display for DecisionProcedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a procedure name is not recognised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown decision procedure `{0}` (expected reflex, minimax, alphabeta or expectimax)")]
pub struct UnknownProcedure(pub String);

impl FromStr for DecisionProcedure {
    type Err = UnknownProcedure;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', '_'], "");
        DecisionProcedure::ALL
            .into_iter()
            .find(|procedure| procedure.label() == normalized)
            .ok_or_else(|| UnknownProcedure(value.to_owned()))
    }
}

/// Controlled agent choosing the seeker's moves.
#[derive(Clone, Debug)]
pub struct SeekerAgent {
    procedure: DecisionProcedure,
    depth: u32,
    weights: HeuristicWeights,
    guard: OscillationGuard,
}

impl SeekerAgent {
    /// Creates an agent with an empty movement history.
    #[must_use]
    pub fn new(procedure: DecisionProcedure, depth: u32, weights: HeuristicWeights) -> Self {
        Self {
            procedure,
            depth,
            weights,
            guard: OscillationGuard::new(),
        }
    }

    /// Procedure driving the agent.
    #[must_use]
    pub const fn procedure(&self) -> DecisionProcedure {
        self.procedure
    }

    /// Game-tree depth in full rounds.
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Evaluation weights.
    #[must_use]
    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }

    /// Movement history and back-and-forth streak.
    #[must_use]
    pub fn guard(&self) -> &OscillationGuard {
        &self.guard
    }

    /// Chooses the seeker's next move and records its current position.
    ///
    /// Returns [`Move::stop`] when the seeker has no legal move.
    pub fn choose_move<R>(&mut self, grid: &GridWorld, state: &GameState, rng: &mut R) -> Move
    where
        R: Rng + ?Sized,
    {
        let position = state.seeker();
        self.guard.record(position);

        let moves = state.legal_moves(grid, SEEKER);
        if moves.is_empty() {
            return Move::stop(position);
        }

        let previous = self.guard.previous();
        let recent = self.guard.recent();
        let chosen = match self.procedure.tree_search() {
            None => reflex::choose_reflex(state, &moves, &recent, previous, &self.weights, rng),
            Some(search) => {
                let tree = GameTree::new(grid, &self.weights, search, self.depth);
                tree.best_move(state, &moves, |step| {
                    let destination = Some(step.destination());
                    let mut nudge = 0.0;
                    if destination == previous {
                        nudge += BACKTRACK_NUDGE;
                    }
                    if recent.iter().any(|cell| Some(*cell) == destination) {
                        nudge += REVISIT_NUDGE;
                    }
                    nudge
                })
            }
        }
        .unwrap_or_else(|| Move::stop(position));

        self.guard.review(chosen, &moves, rng)
    }
}

#[cfg(test)]
mod tests {
    use grid_chase_core::{CellCoord, Direction};
    use grid_chase_world::Chaser;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn procedures_parse_from_common_spellings() {
        assert_eq!("alpha-beta".parse::<DecisionProcedure>(), Ok(DecisionProcedure::AlphaBeta));
        assert_eq!("AlphaBeta".parse::<DecisionProcedure>(), Ok(DecisionProcedure::AlphaBeta));
        assert_eq!(" expectimax ".parse::<DecisionProcedure>(), Ok(DecisionProcedure::Expectimax));
        assert_eq!(
            "mcts".parse::<DecisionProcedure>(),
            Err(UnknownProcedure("mcts".to_owned()))
        );
    }

    #[test]
    fn boxed_in_seeker_stops() {
        let walls = [CellCoord::new(1, 0), CellCoord::new(0, 1)];
        let grid = GridWorld::new(2, 2, walls).expect("valid grid");
        let state = GameState::new(CellCoord::new(0, 0), Vec::new(), [CellCoord::new(1, 1)], []);
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        for procedure in DecisionProcedure::ALL {
            let mut agent = SeekerAgent::new(procedure, DEFAULT_DEPTH, HeuristicWeights::default());
            let step = agent.choose_move(&grid, &state, &mut rng);
            assert_eq!(step, Move::stop(CellCoord::new(0, 0)), "{procedure}");
        }
    }

    #[test]
    fn every_procedure_grabs_adjacent_last_food() {
        let grid = GridWorld::open(4, 4).expect("valid grid");
        let state = GameState::new(
            CellCoord::new(1, 1),
            vec![Chaser::new(CellCoord::new(3, 3))],
            [CellCoord::new(1, 2)],
            [],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        for procedure in DecisionProcedure::ALL {
            let mut agent = SeekerAgent::new(procedure, DEFAULT_DEPTH, HeuristicWeights::default());
            let step = agent.choose_move(&grid, &state, &mut rng);
            assert_eq!(step.direction(), Direction::South, "{procedure}");
        }
    }
}
