//! Depth-limited game-tree evaluation driven by an explicit frame stack.

use grid_chase_core::{GridWorld, HeuristicWeights, Move};
use grid_chase_world::{GameState, SEEKER};
use serde::{Deserialize, Serialize};

use crate::evaluation::evaluate_state;

/// Backup rule applied at chaser nodes of the game tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeSearch {
    /// Chasers minimise the seeker's value.
    Minimax,
    /// Minimax with alpha-beta pruning.
    #[serde(rename = "alphabeta")]
    AlphaBeta,
    /// Chasers pick uniformly among their legal moves.
    Expectimax,
}

/// Game tree rooted at a seeker decision.
///
/// Depth counts full rounds: every agent moves once per round, the seeker
/// first. Agents without legal moves are skipped without consuming a ply.
#[derive(Debug)]
pub struct GameTree<'a> {
    grid: &'a GridWorld,
    weights: &'a HeuristicWeights,
    search: TreeSearch,
    depth: u32,
}

#[derive(Debug)]
struct Frame {
    state: GameState,
    agent: usize,
    depth: u32,
    moves: Vec<Move>,
    next_child: usize,
    value: f64,
    alpha: f64,
    beta: f64,
}

enum Node {
    Leaf(f64),
    Inner(Frame),
}

impl<'a> GameTree<'a> {
    /// Creates a tree explorer of the given kind and depth in rounds.
    #[must_use]
    pub fn new(
        grid: &'a GridWorld,
        weights: &'a HeuristicWeights,
        search: TreeSearch,
        depth: u32,
    ) -> Self {
        Self {
            grid,
            weights,
            search,
            depth,
        }
    }

    /// Value of `state` with the seeker about to move.
    #[must_use]
    pub fn value(&self, state: &GameState) -> f64 {
        self.evaluate(state.clone(), SEEKER, 0, f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Value of the snapshot reached by the seeker playing `step` from `state`.
    #[must_use]
    pub fn move_value(&self, state: &GameState, step: Move) -> f64 {
        self.child_value(state, step, f64::NEG_INFINITY)
    }

    /// Picks the seeker move with the best adjusted value.
    ///
    /// `nudge` returns a small non-negative amount subtracted from a move's
    /// value before comparison; it only separates near-equal moves. The first
    /// move wins exact ties. Returns `None` when `moves` is empty.
    pub fn best_move<F>(&self, state: &GameState, moves: &[Move], nudge: F) -> Option<Move>
    where
        F: Fn(Move) -> f64,
    {
        let mut best: Option<(Move, f64)> = None;
        for step in moves {
            let floor = best.map_or(f64::NEG_INFINITY, |(_, adjusted)| adjusted);
            let adjusted = self.child_value(state, *step, floor) - nudge(*step);
            if best.map_or(true, |(_, current)| adjusted > current) {
                best = Some((*step, adjusted));
            }
        }
        best.map(|(step, _)| step)
    }

    fn child_value(&self, state: &GameState, step: Move, alpha: f64) -> f64 {
        let child = state.successor(SEEKER, step);
        let (agent, depth) = self.advance(state, SEEKER, 0);
        let alpha = if self.search == TreeSearch::AlphaBeta {
            alpha
        } else {
            f64::NEG_INFINITY
        };
        self.evaluate(child, agent, depth, alpha, f64::INFINITY)
    }

    fn advance(&self, state: &GameState, agent: usize, depth: u32) -> (usize, u32) {
        let next = (agent + 1) % state.agent_count();
        let depth = if next == SEEKER { depth + 1 } else { depth };
        (next, depth)
    }

    fn open(&self, state: GameState, agent: usize, depth: u32, alpha: f64, beta: f64) -> Node {
        let (mut agent, mut depth) = (agent, depth);
        loop {
            if depth >= self.depth || state.is_game_over() {
                return Node::Leaf(evaluate_state(&state, self.weights));
            }

            let moves = state.legal_moves(self.grid, agent);
            if moves.is_empty() {
                (agent, depth) = self.advance(&state, agent, depth);
                continue;
            }

            let value = match (agent == SEEKER, self.search) {
                (true, _) => f64::NEG_INFINITY,
                (false, TreeSearch::Expectimax) => 0.0,
                (false, _) => f64::INFINITY,
            };
            return Node::Inner(Frame {
                state,
                agent,
                depth,
                moves,
                next_child: 0,
                value,
                alpha,
                beta,
            });
        }
    }

    /// Folds a child value into `frame`; returns `true` when the rest of the
    /// frame's children can be skipped.
    fn absorb(&self, frame: &mut Frame, child: f64) -> bool {
        if frame.agent == SEEKER {
            frame.value = frame.value.max(child);
            if self.search == TreeSearch::AlphaBeta {
                if frame.value > frame.beta {
                    return true;
                }
                frame.alpha = frame.alpha.max(frame.value);
            }
            return false;
        }

        match self.search {
            TreeSearch::Expectimax => {
                frame.value += child;
                false
            }
            TreeSearch::Minimax => {
                frame.value = frame.value.min(child);
                false
            }
            TreeSearch::AlphaBeta => {
                frame.value = frame.value.min(child);
                if frame.value < frame.alpha {
                    return true;
                }
                frame.beta = frame.beta.min(frame.value);
                false
            }
        }
    }

    fn settle(&self, frame: &Frame) -> f64 {
        if frame.agent != SEEKER && self.search == TreeSearch::Expectimax {
            let mean = frame.value / frame.moves.len() as f64;
            // +∞ and -∞ children cancel to NaN; the loss dominates.
            return if mean.is_nan() { f64::NEG_INFINITY } else { mean };
        }
        frame.value
    }

    fn evaluate(&self, state: GameState, agent: usize, depth: u32, alpha: f64, beta: f64) -> f64 {
        let mut stack = match self.open(state, agent, depth, alpha, beta) {
            Node::Leaf(value) => return value,
            Node::Inner(frame) => vec![frame],
        };
        let mut returned: Option<f64> = None;

        while let Some(frame) = stack.last_mut() {
            let mut done = frame.next_child >= frame.moves.len();
            if let Some(child) = returned.take() {
                done |= self.absorb(frame, child);
            }

            if done {
                let value = self.settle(frame);
                let _ = stack.pop();
                if stack.is_empty() {
                    return value;
                }
                returned = Some(value);
                continue;
            }

            let step = frame.moves[frame.next_child];
            frame.next_child += 1;
            let child = frame.state.successor(frame.agent, step);
            let (next_agent, next_depth) = self.advance(&frame.state, frame.agent, frame.depth);
            let (alpha, beta) = (frame.alpha, frame.beta);

            match self.open(child, next_agent, next_depth, alpha, beta) {
                Node::Leaf(value) => returned = Some(value),
                Node::Inner(next) => stack.push(next),
            }
        }

        f64::NEG_INFINITY
    }
}

#[cfg(test)]
mod tests {
    use grid_chase_core::{CellCoord, Direction};
    use grid_chase_world::Chaser;

    use super::*;

    fn corridor() -> GridWorld {
        GridWorld::open(5, 1).expect("valid grid")
    }

    #[test]
    fn depth_zero_is_a_static_evaluation() {
        let grid = corridor();
        let weights = HeuristicWeights::default();
        let state = GameState::new(CellCoord::new(0, 0), Vec::new(), [CellCoord::new(4, 0)], []);
        let tree = GameTree::new(&grid, &weights, TreeSearch::Minimax, 0);
        assert_eq!(tree.value(&state), evaluate_state(&state, &weights));
    }

    #[test]
    fn minimax_avoids_walking_into_a_chaser() {
        let grid = corridor();
        let weights = HeuristicWeights::default();
        let state = GameState::new(
            CellCoord::new(2, 0),
            vec![Chaser::new(CellCoord::new(4, 0))],
            [CellCoord::new(0, 0), CellCoord::new(4, 0)],
            [],
        );
        let moves = state.legal_moves(&grid, SEEKER);
        let tree = GameTree::new(&grid, &weights, TreeSearch::Minimax, 1);

        let toward = tree.move_value(&state, Move::new(Direction::East, CellCoord::new(3, 0)));
        assert_eq!(toward, f64::NEG_INFINITY);
        let best = tree.best_move(&state, &moves, |_| 0.0).expect("moves available");
        assert_eq!(best.direction(), Direction::West);
    }

    #[test]
    fn expectimax_averages_chaser_outcomes() {
        let grid = corridor();
        let weights = HeuristicWeights::default();
        let state = GameState::new(
            CellCoord::new(1, 0),
            vec![Chaser::new(CellCoord::new(3, 0))],
            [CellCoord::new(0, 0), CellCoord::new(4, 0)],
            [],
        );
        let step = Move::new(Direction::West, CellCoord::new(0, 0));
        let after_seeker = state.successor(SEEKER, step);
        let outcomes = [
            after_seeker.successor(1, Move::new(Direction::East, CellCoord::new(4, 0))),
            after_seeker.successor(1, Move::new(Direction::West, CellCoord::new(2, 0))),
        ];
        let expected = outcomes
            .iter()
            .map(|outcome| evaluate_state(outcome, &weights))
            .sum::<f64>()
            / 2.0;

        let tree = GameTree::new(&grid, &weights, TreeSearch::Expectimax, 1);
        assert!((tree.move_value(&state, step) - expected).abs() < 1e-9);
    }

    #[test]
    fn captured_chaser_passes_without_consuming_depth() {
        let grid = corridor();
        let weights = HeuristicWeights::default();
        let captured = GameState::new(
            CellCoord::new(0, 0),
            vec![Chaser::scared(CellCoord::new(1, 0), 3)],
            [CellCoord::new(4, 0), CellCoord::new(3, 0)],
            [],
        )
        .successor(SEEKER, Move::new(Direction::East, CellCoord::new(1, 0)));
        assert!(!captured.chasers()[0].is_active());

        let solo = GameState::new(
            CellCoord::new(1, 0),
            Vec::new(),
            [CellCoord::new(4, 0), CellCoord::new(3, 0)],
            [],
        )
        .with_score(captured.score());

        for search in [TreeSearch::Minimax, TreeSearch::AlphaBeta, TreeSearch::Expectimax] {
            let tree = GameTree::new(&grid, &weights, search, 2);
            assert_eq!(tree.value(&captured), tree.value(&solo), "{search:?}");
        }
    }

    #[test]
    fn nudge_separates_equal_moves() {
        let grid = GridWorld::open(3, 1).expect("valid grid");
        let weights = HeuristicWeights::default();
        let state = GameState::new(
            CellCoord::new(1, 0),
            Vec::new(),
            [CellCoord::new(0, 0), CellCoord::new(2, 0)],
            [],
        );
        let moves = state.legal_moves(&grid, SEEKER);
        let tree = GameTree::new(&grid, &weights, TreeSearch::AlphaBeta, 1);

        let first = tree.best_move(&state, &moves, |_| 0.0).expect("moves available");
        assert_eq!(first.direction(), Direction::East);
        let avoided = tree
            .best_move(&state, &moves, |step| {
                if step.direction() == Direction::East {
                    0.0001
                } else {
                    0.0
                }
            })
            .expect("moves available");
        assert_eq!(avoided.direction(), Direction::West);
    }
}
