use grid_chase_core::{CellCoord, GridWorld, InferenceConfig};
use rand::Rng;
use tracing::debug;

use crate::{
    belief::{Belief, Support},
    model::observation_likelihood,
    Inference, InferenceError,
};

/// Exact Bayesian filter keeping one probability per legal cell.
#[derive(Clone, Debug)]
pub struct ExactInference {
    support: Support,
    weights: Vec<f64>,
    config: InferenceConfig,
}

impl ExactInference {
    /// Creates a filter with a uniform prior over the legal cells of `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::NoLegalPositions`] when every cell is a wall.
    pub fn new(grid: &GridWorld, config: InferenceConfig) -> Result<Self, InferenceError> {
        let support = Support::new(grid, config.allow_stay);
        if support.is_empty() {
            return Err(InferenceError::NoLegalPositions);
        }
        let mut filter = Self {
            weights: Vec::new(),
            support,
            config,
        };
        filter.reset();
        Ok(filter)
    }

    /// Restores the uniform prior.
    pub fn reset(&mut self) {
        let uniform = 1.0 / self.support.len() as f64;
        self.weights = vec![uniform; self.support.len()];
    }

    /// Filter configuration.
    #[must_use]
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }
}

impl Inference for ExactInference {
    fn observe<R>(&mut self, reading: Option<u32>, seeker: CellCoord, _rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let updated: Vec<f64> = self
            .support
            .cells()
            .iter()
            .zip(&self.weights)
            .map(|(cell, weight)| {
                weight * observation_likelihood(reading, seeker, *cell, None, &self.config)
            })
            .collect();

        let total: f64 = updated.iter().sum();
        if total <= 0.0 {
            debug!(?reading, %seeker, "observation ruled out every cell; resetting belief");
            self.reset();
            return;
        }
        self.weights = updated.into_iter().map(|weight| weight / total).collect();
    }

    fn elapse_time<R>(&mut self, _rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let mut next = vec![0.0; self.weights.len()];
        for (position, weight) in self.weights.iter().enumerate() {
            if *weight == 0.0 {
                continue;
            }
            let targets = self.support.transitions(position);
            let share = weight / targets.len() as f64;
            for target in targets {
                next[*target] += share;
            }
        }

        let total: f64 = next.iter().sum();
        if total <= 0.0 {
            self.reset();
            return;
        }
        self.weights = next.into_iter().map(|weight| weight / total).collect();
    }

    fn belief(&self) -> Belief {
        Belief::from_pairs(self.support.cells().iter().copied().zip(self.weights.iter().copied()))
    }
}
