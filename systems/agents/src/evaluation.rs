//! Static evaluation of game snapshots.

use grid_chase_core::{CellCoord, Direction, HeuristicWeights, Move};
use grid_chase_world::{GameState, SEEKER};

/// Scores a snapshot from the seeker's point of view.
///
/// Wins evaluate to `+∞` and losses to `-∞`. Any other snapshot combines the
/// running score with penalties for leftover food and capsules, distance
/// rewards toward the nearest food, capsule and scared chaser, and a flat
/// penalty when a threatening chaser is within the danger threshold.
#[must_use]
pub fn evaluate_state(state: &GameState, weights: &HeuristicWeights) -> f64 {
    if state.is_won() {
        return f64::INFINITY;
    }
    if state.is_game_over() {
        return f64::NEG_INFINITY;
    }

    let seeker = state.seeker();
    let mut value = state.score() as f64 * weights.score_weight;
    value -= state.food().len() as f64 * weights.food_left_penalty;
    value -= state.capsules().len() as f64 * weights.capsule_left_penalty;

    if let Some(distance) = nearest(seeker, state.food().iter().copied()) {
        value += weights.closest_food_weight / distance;
    }
    if let Some(distance) = nearest(seeker, state.capsules().iter().copied()) {
        value += weights.closest_capsule_weight / distance;
    }

    let chasers = state.chasers();
    if let Some(distance) = nearest(seeker, chasers.iter().filter_map(|c| c.vulnerable_at())) {
        value += weights.scared_ghost_weight / distance;
    }

    let threat = chasers
        .iter()
        .filter_map(|chaser| chaser.threatening_at())
        .map(|cell| cell.manhattan_distance(seeker))
        .min();
    if threat.map_or(false, |distance| distance <= weights.ghost_danger_threshold) {
        value -= weights.ghost_danger_penalty;
    }

    value
}

/// One-ply score of `step` used by the reflex procedure.
///
/// `Stop` scores `-∞` and a move that clears the last food item scores `+∞`.
/// Otherwise the successor is evaluated with [`evaluate_state`] and charged a
/// tenth of the revisit penalty for each occurrence of the destination in
/// `recent`.
#[must_use]
pub fn evaluate_reflex_move(
    state: &GameState,
    step: Move,
    recent: &[CellCoord],
    weights: &HeuristicWeights,
) -> f64 {
    if step.direction() == Direction::Stop {
        return f64::NEG_INFINITY;
    }

    let successor = state.successor(SEEKER, step);
    if successor.food().is_empty() {
        return f64::INFINITY;
    }

    let destination = successor.seeker();
    let revisits = recent.iter().filter(|cell| **cell == destination).count();
    evaluate_state(&successor, weights) - revisits as f64 * weights.revisit_penalty * 0.1
}

/// Distance to the closest of `targets`, floored at one.
fn nearest<I>(origin: CellCoord, targets: I) -> Option<f64>
where
    I: Iterator<Item = CellCoord>,
{
    targets
        .map(|cell| cell.manhattan_distance(origin))
        .min()
        .map(|distance| f64::from(distance.max(1)))
}

#[cfg(test)]
mod tests {
    use grid_chase_world::Chaser;

    use super::*;

    fn unit_weights() -> HeuristicWeights {
        HeuristicWeights {
            score_weight: 1.0,
            food_left_penalty: 10.0,
            closest_food_weight: 6.0,
            capsule_left_penalty: 20.0,
            closest_capsule_weight: 8.0,
            scared_ghost_weight: 12.0,
            ghost_danger_penalty: 100.0,
            ghost_danger_threshold: 2,
            revisit_penalty: 50.0,
        }
    }

    #[test]
    fn terminal_states_are_infinite() {
        let weights = HeuristicWeights::default();
        let state = GameState::new(CellCoord::new(0, 0), Vec::new(), [CellCoord::new(1, 0)], []);
        let won = state.successor(SEEKER, Move::new(Direction::East, CellCoord::new(1, 0)));
        assert_eq!(evaluate_state(&won, &weights), f64::INFINITY);

        let trapped = GameState::new(
            CellCoord::new(0, 0),
            vec![Chaser::new(CellCoord::new(1, 0))],
            [CellCoord::new(3, 0)],
            [],
        );
        let lost = trapped.successor(SEEKER, Move::new(Direction::East, CellCoord::new(1, 0)));
        assert_eq!(evaluate_state(&lost, &weights), f64::NEG_INFINITY);
    }

    #[test]
    fn evaluation_combines_every_term() {
        let state = GameState::new(
            CellCoord::new(0, 0),
            vec![
                Chaser::scared(CellCoord::new(0, 4), 5),
                Chaser::new(CellCoord::new(2, 0)),
            ],
            [CellCoord::new(3, 0), CellCoord::new(0, 2)],
            [CellCoord::new(0, 0)],
        )
        .with_score(7);

        // 7 - 2*10 - 1*20 + 6/2 + 8/1 + 12/4 - 100
        let expected = 7.0 - 20.0 - 20.0 + 3.0 + 8.0 + 3.0 - 100.0;
        assert!((evaluate_state(&state, &unit_weights()) - expected).abs() < 1e-9);
    }

    #[test]
    fn captured_chasers_are_ignored() {
        let weights = unit_weights();
        let base = GameState::new(
            CellCoord::new(0, 0),
            vec![Chaser::scared(CellCoord::new(1, 0), 5)],
            [CellCoord::new(4, 4)],
            [],
        );
        let captured = base.successor(SEEKER, Move::new(Direction::East, CellCoord::new(1, 0)));
        assert!(!captured.chasers()[0].is_active());

        let alone = GameState::new(CellCoord::new(1, 0), Vec::new(), [CellCoord::new(4, 4)], [])
            .with_score(captured.score());
        assert_eq!(evaluate_state(&captured, &weights), evaluate_state(&alone, &weights));
    }

    #[test]
    fn reflex_rejects_stop_and_loves_the_last_pellet() {
        let weights = HeuristicWeights::default();
        let state = GameState::new(CellCoord::new(0, 0), Vec::new(), [CellCoord::new(1, 0)], []);

        assert_eq!(
            evaluate_reflex_move(&state, Move::stop(state.seeker()), &[], &weights),
            f64::NEG_INFINITY
        );
        assert_eq!(
            evaluate_reflex_move(
                &state,
                Move::new(Direction::East, CellCoord::new(1, 0)),
                &[],
                &weights
            ),
            f64::INFINITY
        );
    }

    #[test]
    fn reflex_charges_each_recent_visit() {
        let weights = unit_weights();
        let state = GameState::new(CellCoord::new(1, 1), Vec::new(), [CellCoord::new(4, 4)], []);
        let step = Move::new(Direction::West, CellCoord::new(0, 1));
        let fresh = evaluate_reflex_move(&state, step, &[], &weights);
        let twice = evaluate_reflex_move(
            &state,
            step,
            &[CellCoord::new(0, 1), CellCoord::new(1, 1), CellCoord::new(0, 1)],
            &weights,
        );
        assert!((fresh - twice - 2.0 * 50.0 * 0.1).abs() < 1e-9);
    }
}
