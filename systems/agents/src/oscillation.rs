//! Detection and breaking of back-and-forth seeker movement.

use std::collections::VecDeque;

use grid_chase_core::{CellCoord, Move};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

/// Number of seeker positions remembered between decisions.
pub const HISTORY_LENGTH: usize = 5;
/// Consecutive back-and-forth decisions tolerated before an override.
pub const STREAK_LIMIT: u32 = 3;

/// Tracks recent seeker positions and overrides decisions that keep bouncing
/// between the same two cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OscillationGuard {
    recent: VecDeque<CellCoord>,
    streak: u32,
}

impl OscillationGuard {
    /// Creates a guard with an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the seeker's position at the start of a decision.
    ///
    /// The streak grows when the seeker is back where it stood two decisions
    /// ago and decays by one otherwise.
    pub fn record(&mut self, position: CellCoord) {
        self.recent.push_front(position);
        self.recent.truncate(HISTORY_LENGTH);

        if self.recent.get(2) == Some(&position) {
            self.streak += 1;
        } else {
            self.streak = self.streak.saturating_sub(1);
        }
    }

    /// Position recorded at the previous decision.
    #[must_use]
    pub fn previous(&self) -> Option<CellCoord> {
        self.recent.get(1).copied()
    }

    /// Positions recorded most recent first, the current one included.
    #[must_use]
    pub fn recent(&self) -> Vec<CellCoord> {
        self.recent.iter().copied().collect()
    }

    /// Current back-and-forth streak.
    #[must_use]
    pub const fn streak(&self) -> u32 {
        self.streak
    }

    /// Returns `chosen`, or a random non-backtracking alternative from
    /// `moves` once the streak exceeds [`STREAK_LIMIT`].
    pub fn review<R>(&mut self, chosen: Move, moves: &[Move], rng: &mut R) -> Move
    where
        R: Rng + ?Sized,
    {
        if self.streak <= STREAK_LIMIT {
            return chosen;
        }

        let previous = self.previous();
        let forward: Vec<Move> = moves
            .iter()
            .copied()
            .filter(|step| Some(step.destination()) != previous)
            .collect();
        let Some(replacement) = forward.choose(rng).copied() else {
            return chosen;
        };

        debug!(
            streak = self.streak,
            from = %chosen.destination(),
            to = %replacement.destination(),
            "breaking seeker oscillation"
        );
        self.streak = 0;
        replacement
    }
}
