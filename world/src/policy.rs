//! Directional pursuit policy driving chasers during live play.

use grid_chase_core::{CellCoord, Move};
use rand::Rng;

use crate::PURSUIT_PROBABILITY;

/// Biased random walk that leans toward (or away from) the seeker.
///
/// Moves that minimise the distance to the seeker (maximise it while scared)
/// share `attack_probability` (`flee_probability`) evenly; every legal move,
/// best ones included, additionally shares the remaining mass evenly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalPursuit {
    attack_probability: f64,
    flee_probability: f64,
}

impl DirectionalPursuit {
    /// Creates a policy with explicit attack and flee probabilities in `[0, 1]`.
    #[must_use]
    pub fn new(attack_probability: f64, flee_probability: f64) -> Self {
        Self {
            attack_probability: attack_probability.clamp(0.0, 1.0),
            flee_probability: flee_probability.clamp(0.0, 1.0),
        }
    }

    /// Probability assigned to each of `moves` for a chaser facing `seeker`.
    #[must_use]
    pub fn distribution(&self, moves: &[Move], seeker: CellCoord, scared: bool) -> Vec<f64> {
        if moves.is_empty() {
            return Vec::new();
        }

        let distances: Vec<u32> = moves
            .iter()
            .map(|step| step.destination().manhattan_distance(seeker))
            .collect();
        let target = if scared {
            distances.iter().copied().max()
        } else {
            distances.iter().copied().min()
        }
        .unwrap_or(0);
        let best_count = distances.iter().filter(|distance| **distance == target).count();
        let best_probability = if scared {
            self.flee_probability
        } else {
            self.attack_probability
        };

        let shared = (1.0 - best_probability) / moves.len() as f64;
        let bonus = best_probability / best_count as f64;
        distances
            .iter()
            .map(|distance| {
                if *distance == target {
                    shared + bonus
                } else {
                    shared
                }
            })
            .collect()
    }

    /// Samples one of `moves`; `None` when there is nothing to choose from.
    pub fn choose<R>(&self, moves: &[Move], seeker: CellCoord, scared: bool, rng: &mut R) -> Option<Move>
    where
        R: Rng + ?Sized,
    {
        let weights = self.distribution(moves, seeker, scared);
        let draw: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (step, weight) in moves.iter().zip(&weights) {
            cumulative += weight;
            if draw <= cumulative {
                return Some(*step);
            }
        }
        moves.last().copied()
    }
}

impl Default for DirectionalPursuit {
    fn default() -> Self {
        Self::new(PURSUIT_PROBABILITY, PURSUIT_PROBABILITY)
    }
}
