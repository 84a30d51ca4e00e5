#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bayesian tracking of hidden chasers from noisy distance readings.
//!
//! Every filter is built over the legal cells of a [`GridWorld`](grid_chase_core::GridWorld)
//! and advanced by alternating [`Inference::observe`] and
//! [`Inference::elapse_time`]. [`ExactInference`] keeps the full
//! distribution, [`ParticleFilter`] approximates it with samples and
//! [`JointParticleFilter`] tracks several chasers together. Degenerate
//! observations that rule out every hypothesis reset the filter to its
//! uniform prior instead of failing.

use grid_chase_core::CellCoord;
use rand::Rng;
use thiserror::Error;

mod belief;
mod exact;
mod joint;
mod model;
mod particle;

pub use belief::Belief;
pub use exact::ExactInference;
pub use joint::{JointParticleFilter, JOINT_ENUMERATION_LIMIT};
pub use model::{observation_likelihood, transition_targets, NoisySensor};
pub use particle::ParticleFilter;

/// Reasons a filter cannot be constructed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InferenceError {
    /// The grid has no cell a chaser could occupy.
    #[error("grid has no legal positions to track")]
    NoLegalPositions,
    /// The configured particle count is zero.
    #[error("particle count must be positive")]
    NoParticles,
    /// A joint filter was requested for zero chasers.
    #[error("joint filter needs at least one chaser")]
    NoChasers,
}

/// Filter tracking a single chaser.
pub trait Inference {
    /// Conditions the belief on a distance `reading` taken from `seeker`.
    fn observe<R>(&mut self, reading: Option<u32>, seeker: CellCoord, rng: &mut R)
    where
        R: Rng + ?Sized;

    /// Advances the belief by one chaser move.
    fn elapse_time<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized;

    /// Snapshot of the current belief.
    fn belief(&self) -> Belief;
}
