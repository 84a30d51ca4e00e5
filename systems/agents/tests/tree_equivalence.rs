use std::collections::BTreeSet;

use grid_chase_core::{CellCoord, GridWorld, HeuristicWeights};
use grid_chase_system_agents::{evaluate_state, GameTree, TreeSearch};
use grid_chase_world::{Chaser, GameState, SEEKER};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn random_position(seed: u64) -> (GridWorld, GameState) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let walls = [CellCoord::new(2, 1), CellCoord::new(2, 2)]
        .into_iter()
        .filter(|_| rng.gen_bool(0.5));
    let grid = GridWorld::new(5, 4, walls).expect("walls in bounds");

    let mut cells = grid.legal_positions();
    cells.shuffle(&mut rng);
    let mut cells = cells.into_iter();
    let seeker = cells.next().expect("legal cell");

    let chaser_count = rng.gen_range(1..=2);
    let chasers: Vec<Chaser> = (0..chaser_count)
        .filter_map(|_| cells.next())
        .map(|cell| {
            if rng.gen_bool(0.3) {
                Chaser::scared(cell, rng.gen_range(1..4))
            } else {
                Chaser::new(cell)
            }
        })
        .collect();

    let food_count = rng.gen_range(1..=4);
    let food: BTreeSet<CellCoord> = cells.by_ref().take(food_count).collect();
    let capsules: Vec<CellCoord> = cells.take(usize::from(rng.gen_bool(0.4))).collect();

    let state = GameState::new(seeker, chasers, food, capsules).with_score(rng.gen_range(-20..20));
    (grid, state)
}

fn reference_value(
    grid: &GridWorld,
    weights: &HeuristicWeights,
    state: &GameState,
    agent: usize,
    depth: u32,
    max_depth: u32,
    average: bool,
) -> f64 {
    if depth >= max_depth || state.is_game_over() {
        return evaluate_state(state, weights);
    }
    let next = (agent + 1) % state.agent_count();
    let next_depth = if next == SEEKER { depth + 1 } else { depth };
    let moves = state.legal_moves(grid, agent);
    if moves.is_empty() {
        return reference_value(grid, weights, state, next, next_depth, max_depth, average);
    }

    let values = moves.iter().map(|step| {
        reference_value(
            grid,
            weights,
            &state.successor(agent, *step),
            next,
            next_depth,
            max_depth,
            average,
        )
    });
    if agent == SEEKER {
        values.fold(f64::NEG_INFINITY, f64::max)
    } else if average {
        let mean = values.sum::<f64>() / moves.len() as f64;
        if mean.is_nan() {
            f64::NEG_INFINITY
        } else {
            mean
        }
    } else {
        values.fold(f64::INFINITY, f64::min)
    }
}

fn same(left: f64, right: f64) -> bool {
    left == right || (left - right).abs() < 1e-9
}

#[test]
fn alpha_beta_matches_minimax_on_random_positions() {
    let weights = HeuristicWeights::default();
    for seed in 0..150 {
        let (grid, state) = random_position(seed);
        for depth in 1..=2 {
            let minimax = GameTree::new(&grid, &weights, TreeSearch::Minimax, depth).value(&state);
            let pruned = GameTree::new(&grid, &weights, TreeSearch::AlphaBeta, depth).value(&state);
            assert!(same(minimax, pruned), "seed {seed} depth {depth}: {minimax} vs {pruned}");
        }
    }
}

#[test]
fn alpha_beta_picks_the_same_root_move_as_minimax() {
    let weights = HeuristicWeights::default();
    for seed in 0..150 {
        let (grid, state) = random_position(seed);
        let moves = state.legal_moves(&grid, SEEKER);
        let nudge = |step: grid_chase_core::Move| {
            if step.destination().column() % 2 == 0 {
                0.0001
            } else {
                0.0
            }
        };
        let minimax = GameTree::new(&grid, &weights, TreeSearch::Minimax, 2);
        let pruned = GameTree::new(&grid, &weights, TreeSearch::AlphaBeta, 2);
        assert_eq!(
            minimax.best_move(&state, &moves, nudge),
            pruned.best_move(&state, &moves, nudge),
            "seed {seed}"
        );
    }
}

#[test]
fn frame_stack_agrees_with_recursive_definition() {
    let weights = HeuristicWeights::default();
    for seed in 0..100 {
        let (grid, state) = random_position(seed);
        for depth in 0..=2 {
            let minimax = GameTree::new(&grid, &weights, TreeSearch::Minimax, depth).value(&state);
            let expected = reference_value(&grid, &weights, &state, SEEKER, 0, depth, false);
            assert!(same(minimax, expected), "minimax seed {seed} depth {depth}");

            let expectimax =
                GameTree::new(&grid, &weights, TreeSearch::Expectimax, depth).value(&state);
            let expected = reference_value(&grid, &weights, &state, SEEKER, 0, depth, true);
            assert!(same(expectimax, expected), "expectimax seed {seed} depth {depth}");
        }
    }
}

#[test]
fn expectimax_is_never_below_minimax() {
    let weights = HeuristicWeights::default();
    for seed in 0..100 {
        let (grid, state) = random_position(seed);
        let minimax = GameTree::new(&grid, &weights, TreeSearch::Minimax, 2).value(&state);
        let expectimax = GameTree::new(&grid, &weights, TreeSearch::Expectimax, 2).value(&state);
        assert!(expectimax >= minimax || same(expectimax, minimax), "seed {seed}");
    }
}
