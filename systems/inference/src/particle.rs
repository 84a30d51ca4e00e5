use grid_chase_core::{CellCoord, GridWorld, InferenceConfig};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::{
    belief::{Belief, Support},
    model::observation_likelihood,
    Inference, InferenceError,
};

/// Particle filter approximating the belief with a fixed number of samples.
#[derive(Clone, Debug)]
pub struct ParticleFilter {
    support: Support,
    particles: Vec<usize>,
    config: InferenceConfig,
}

impl ParticleFilter {
    /// Creates a filter with `config.particle_count` particles spread evenly
    /// over the legal cells of `grid`.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::NoLegalPositions`] for an all-wall grid and
    /// [`InferenceError::NoParticles`] when the particle count is zero.
    pub fn new<R>(grid: &GridWorld, config: InferenceConfig, rng: &mut R) -> Result<Self, InferenceError>
    where
        R: Rng + ?Sized,
    {
        let support = Support::new(grid, config.allow_stay);
        if support.is_empty() {
            return Err(InferenceError::NoLegalPositions);
        }
        if config.particle_count == 0 {
            return Err(InferenceError::NoParticles);
        }
        let mut filter = Self {
            support,
            particles: Vec::new(),
            config,
        };
        filter.reset(rng);
        Ok(filter)
    }

    /// Cycles the legal cells to fill every particle, then shuffles them.
    pub fn reset<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let cells = self.support.len();
        self.particles = (0..self.config.particle_count)
            .map(|index| index % cells)
            .collect();
        self.particles.shuffle(rng);
    }

    /// Current particle positions.
    #[must_use]
    pub fn particles(&self) -> Vec<CellCoord> {
        self.particles
            .iter()
            .map(|position| self.support.cell(*position))
            .collect()
    }

    /// Number of particles; constant for the lifetime of the filter.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }
}

impl Inference for ParticleFilter {
    fn observe<R>(&mut self, reading: Option<u32>, seeker: CellCoord, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let weights: Vec<f64> = self
            .particles
            .iter()
            .map(|position| {
                let cell = self.support.cell(*position);
                observation_likelihood(reading, seeker, cell, None, &self.config)
            })
            .collect();

        match resample(&self.particles, &weights, rng) {
            Some(particles) => self.particles = particles,
            None => {
                debug!(?reading, %seeker, "every particle ruled out; resetting particles");
                self.reset(rng);
            }
        }
    }

    fn elapse_time<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for position in &mut self.particles {
            if let Some(next) = self.support.transitions(*position).choose(rng) {
                *position = *next;
            }
        }
    }

    fn belief(&self) -> Belief {
        self.support.histogram(self.particles.iter().copied())
    }
}

/// Draws `particles.len()` samples with replacement, proportionally to
/// `weights`, by inverting the cumulative distribution. Returns `None` when
/// the weights carry no mass.
pub(crate) fn resample<T, R>(particles: &[T], weights: &[f64], rng: &mut R) -> Option<Vec<T>>
where
    T: Clone,
    R: Rng + ?Sized,
{
    let total: f64 = weights.iter().sum();
    if !(total > 0.0) {
        return None;
    }
    let last = weights.iter().rposition(|weight| *weight > 0.0)?;

    let mut running = 0.0;
    let cumulative: Vec<f64> = weights
        .iter()
        .map(|weight| {
            running += weight / total;
            running
        })
        .collect();

    Some(
        (0..particles.len())
            .map(|_| {
                let draw: f64 = rng.gen();
                let index = cumulative.partition_point(|mass| *mass <= draw).min(last);
                particles[index].clone()
            })
            .collect(),
    )
}
