use grid_chase_core::{CellCoord, HeuristicWeights, Move};
use grid_chase_world::GameState;
use rand::{seq::SliceRandom, Rng};

use crate::evaluation::evaluate_reflex_move;

/// Scores within this absolute distance of the best are treated as ties.
pub(crate) const REFLEX_EPSILON: f64 = 0.01;

/// One-ply choice among `moves`; `None` when `moves` is empty.
pub(crate) fn choose_reflex<R>(
    state: &GameState,
    moves: &[Move],
    recent: &[CellCoord],
    previous: Option<CellCoord>,
    weights: &HeuristicWeights,
    rng: &mut R,
) -> Option<Move>
where
    R: Rng + ?Sized,
{
    let scored: Vec<(Move, f64)> = moves
        .iter()
        .map(|step| (*step, evaluate_reflex_move(state, *step, recent, weights)))
        .collect();
    let best = scored
        .iter()
        .map(|(_, score)| *score)
        .fold(f64::NEG_INFINITY, f64::max);

    let near_best: Vec<Move> = scored
        .into_iter()
        .filter(|(_, score)| *score == best || (best - score).abs() < REFLEX_EPSILON)
        .map(|(step, _)| step)
        .collect();

    let forward: Vec<Move> = near_best
        .iter()
        .copied()
        .filter(|step| Some(step.destination()) != previous)
        .collect();
    let candidates = if forward.is_empty() {
        near_best
    } else {
        forward
    };

    candidates.choose(rng).copied()
}
