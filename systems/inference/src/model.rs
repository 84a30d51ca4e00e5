//! Observation and transition models shared by every filter.

use grid_chase_core::{CellCoord, GridWorld, InferenceConfig};
use rand::Rng;

/// Likelihood of `reading` given the chaser stands on `hypothesis`.
///
/// A hypothesis on the `jail` cell is only consistent with a missing reading,
/// and a missing reading is inconsistent with every other hypothesis. Errors
/// beyond `noise_range` are impossible; smaller errors decay exponentially
/// with rate `observation_lambda`.
#[must_use]
pub fn observation_likelihood(
    reading: Option<u32>,
    seeker: CellCoord,
    hypothesis: CellCoord,
    jail: Option<CellCoord>,
    config: &InferenceConfig,
) -> f64 {
    if jail == Some(hypothesis) {
        return if reading.is_none() { 1.0 } else { 0.0 };
    }
    let Some(reading) = reading else {
        return 0.0;
    };

    let error = reading.abs_diff(seeker.manhattan_distance(hypothesis));
    if error > config.noise_range {
        return 0.0;
    }
    (-config.observation_lambda * f64::from(error)).exp()
}

/// Cells a chaser on `cell` may occupy after one time step.
///
/// The legal 4-neighbours come first, followed by `cell` itself when staying
/// is allowed. A cell with no legal neighbour keeps the chaser in place.
#[must_use]
pub fn transition_targets(grid: &GridWorld, cell: CellCoord, allow_stay: bool) -> Vec<CellCoord> {
    let mut targets: Vec<CellCoord> = grid.neighbors(cell).collect();
    if allow_stay || targets.is_empty() {
        targets.push(cell);
    }
    targets
}

/// Distance sensor reporting the seeker-to-chaser distance with uniform noise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoisySensor {
    noise_range: u32,
}

impl NoisySensor {
    /// Creates a sensor whose error is uniform over `[-noise_range, noise_range]`.
    #[must_use]
    pub const fn new(noise_range: u32) -> Self {
        Self { noise_range }
    }

    /// Builds a sensor matching the filters' observation model.
    #[must_use]
    pub const fn from_config(config: &InferenceConfig) -> Self {
        Self::new(config.noise_range)
    }

    /// Produces a reading, or `None` when the chaser has been captured.
    ///
    /// Negative noisy distances are clamped to zero.
    pub fn read<R>(&self, seeker: CellCoord, chaser: Option<CellCoord>, rng: &mut R) -> Option<u32>
    where
        R: Rng + ?Sized,
    {
        let chaser = chaser?;
        let range = i64::from(self.noise_range);
        let noise = rng.gen_range(-range..=range);
        let noisy = i64::from(seeker.manhattan_distance(chaser)) + noise;
        Some(u32::try_from(noisy.max(0)).unwrap_or(u32::MAX))
    }
}
