#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game rules for the Grid Chase pursuit game.
//!
//! A [`GameState`] is an immutable snapshot. Decision procedures explore the
//! game tree through [`GameState::successor`], which moves one agent at a
//! time, while live play advances a whole turn through [`step_turn`], where
//! the seeker moves first and every active chaser then follows the
//! [`DirectionalPursuit`] policy.

use grid_chase_core::{GridWorld, Move};
use rand::Rng;
use tracing::debug;

mod policy;
mod state;

pub use policy::DirectionalPursuit;
pub use state::{Chaser, GameState, GameStatus, SEEKER};

/// Points awarded for eating a food item.
pub const FOOD_REWARD: i64 = 10;
/// Points awarded for eating a capsule.
pub const CAPSULE_REWARD: i64 = 200;
/// Points awarded for capturing a scared chaser.
pub const CHASER_REWARD: i64 = 200;
/// Points charged for every seeker move.
pub const MOVE_COST: i64 = 1;
/// Turns a chaser stays scared after a capsule is eaten.
pub const SCARED_DURATION: u32 = 40;
/// Turn count at which an unfinished game is declared lost.
pub const TURN_LIMIT: u32 = 1_000;
/// Probability mass given to the best moves when attacking or fleeing.
pub const PURSUIT_PROBABILITY: f64 = 0.8;

/// Plays one full turn and returns the resulting snapshot.
///
/// The seeker applies `seeker_move` first. If that ends the game (collision
/// with a threatening chaser or the last food item eaten) the chasers stay
/// put. Otherwise every active chaser samples a move from `policy` toward the
/// seeker's new cell, collisions are resolved again and the turn limit is
/// enforced. Terminal snapshots are returned unchanged.
#[must_use]
pub fn step_turn<R>(
    grid: &GridWorld,
    state: &GameState,
    seeker_move: Move,
    policy: &DirectionalPursuit,
    rng: &mut R,
) -> GameState
where
    R: Rng + ?Sized,
{
    if state.is_game_over() {
        return state.clone();
    }

    let mut next = state.clone();
    next.set_turn(state.turn().saturating_add(1));
    next.advance_seeker(seeker_move.destination());

    if !next.is_game_over() {
        let seeker = next.seeker();
        for index in 0..next.chasers().len() {
            let chaser = next.chasers()[index];
            let Some(position) = chaser.position() else {
                continue;
            };
            let moves: Vec<Move> = grid.legal_moves(position).collect();
            if let Some(step) = policy.choose(&moves, seeker, chaser.is_scared(), rng) {
                next.relocate_chaser(index, step.destination());
            }
        }
        next.resolve_collisions();
    }

    if !next.is_game_over() && next.turn() >= TURN_LIMIT {
        next.mark_lost();
    }

    if next.is_game_over() {
        debug!(
            turn = next.turn(),
            score = next.score(),
            won = next.is_won(),
            "game finished"
        );
    }

    next
}
