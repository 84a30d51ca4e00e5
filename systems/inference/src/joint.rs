use grid_chase_core::{CellCoord, GridWorld, InferenceConfig};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::{
    belief::{Belief, Support},
    model::observation_likelihood,
    particle::resample,
    InferenceError,
};

/// Largest joint hypothesis space enumerated exhaustively when spreading
/// particles; larger spaces are sampled coordinate by coordinate.
pub const JOINT_ENUMERATION_LIMIT: usize = 100_000;

/// Particle filter tracking several chasers at once.
///
/// Each particle holds one position per chaser, so correlations between
/// chasers survive resampling. Readings are weighed with the product of the
/// per-chaser likelihoods.
#[derive(Clone, Debug)]
pub struct JointParticleFilter {
    support: Support,
    particles: Vec<Vec<usize>>,
    jails: Vec<Option<CellCoord>>,
    config: InferenceConfig,
}

impl JointParticleFilter {
    /// Creates a filter for `chaser_count` chasers with a uniform prior.
    ///
    /// # Errors
    ///
    /// Returns [`InferenceError::NoLegalPositions`] for an all-wall grid,
    /// [`InferenceError::NoParticles`] when the particle count is zero and
    /// [`InferenceError::NoChasers`] when `chaser_count` is zero.
    pub fn new<R>(
        grid: &GridWorld,
        chaser_count: usize,
        config: InferenceConfig,
        rng: &mut R,
    ) -> Result<Self, InferenceError>
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
        if chaser_count == 0 {
            return Err(InferenceError::NoChasers);
        }

        let mut filter = Self {
            support,
            particles: Vec::new(),
            jails: vec![None; chaser_count],
            config,
        };
        filter.reset(rng);
        Ok(filter)
    }

    /// Assigns a jail cell per chaser; missing entries mean no jail.
    #[must_use]
    pub fn with_jails(mut self, jails: &[Option<CellCoord>]) -> Self {
        for (slot, jail) in self.jails.iter_mut().zip(jails) {
            *slot = *jail;
        }
        self
    }

    /// Number of tracked chasers.
    #[must_use]
    pub fn chaser_count(&self) -> usize {
        self.jails.len()
    }

    /// Number of particles; constant for the lifetime of the filter.
    #[must_use]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Spreads the particles uniformly over the joint hypothesis space.
    ///
    /// Small spaces are enumerated, shuffled and cycled; larger ones are
    /// sampled independently per chaser.
    pub fn reset<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let cells = self.support.len();
        let chasers = self.chaser_count();
        let count = self.config.particle_count;

        let space = u32::try_from(chasers)
            .ok()
            .and_then(|exponent| cells.checked_pow(exponent))
            .filter(|space| *space <= JOINT_ENUMERATION_LIMIT);

        self.particles = match space {
            Some(space) => {
                let mut tuples: Vec<Vec<usize>> =
                    (0..space).map(|rank| decode(rank, cells, chasers)).collect();
                tuples.shuffle(rng);
                tuples.into_iter().cycle().take(count).collect()
            }
            None => (0..count)
                .map(|_| (0..chasers).map(|_| rng.gen_range(0..cells)).collect())
                .collect(),
        };
    }

    /// Weighs every particle against one reading per chaser and resamples.
    ///
    /// Missing entries in `readings` count as `None`.
    pub fn observe<R>(&mut self, readings: &[Option<u32>], seeker: CellCoord, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let weights: Vec<f64> = self
            .particles
            .iter()
            .map(|tuple| {
                tuple
                    .iter()
                    .zip(&self.jails)
                    .enumerate()
                    .map(|(chaser, (position, jail))| {
                        let reading = readings.get(chaser).copied().flatten();
                        let cell = self.support.cell(*position);
                        observation_likelihood(reading, seeker, cell, *jail, &self.config)
                    })
                    .product::<f64>()
            })
            .collect();

        match resample(&self.particles, &weights, rng) {
            Some(particles) => self.particles = particles,
            None => {
                debug!(?readings, %seeker, "every joint particle ruled out; resetting particles");
                self.reset(rng);
            }
        }
    }

    /// Moves every chaser of every particle independently.
    pub fn elapse_time<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for tuple in &mut self.particles {
            for position in tuple.iter_mut() {
                if let Some(next) = self.support.transitions(*position).choose(rng) {
                    *position = *next;
                }
            }
        }
    }

    /// Belief over chaser `chaser` alone; `None` for an unknown index.
    #[must_use]
    pub fn marginal(&self, chaser: usize) -> Option<Belief> {
        if chaser >= self.chaser_count() {
            return None;
        }
        Some(
            self.support
                .histogram(self.particles.iter().map(|tuple| tuple[chaser])),
        )
    }

    /// Every marginal in chaser order.
    #[must_use]
    pub fn marginals(&self) -> Vec<Belief> {
        (0..self.chaser_count())
            .filter_map(|chaser| self.marginal(chaser))
            .collect()
    }

    /// Particle tuples as cells.
    #[must_use]
    pub fn particles(&self) -> Vec<Vec<CellCoord>> {
        self.particles
            .iter()
            .map(|tuple| tuple.iter().map(|position| self.support.cell(*position)).collect())
            .collect()
    }
}

/// Mixed-radix decoding of `rank` into one position per chaser.
fn decode(mut rank: usize, radix: usize, digits: usize) -> Vec<usize> {
    let mut tuple = vec![0; digits];
    for slot in tuple.iter_mut().rev() {
        *slot = rank % radix;
        rank /= radix;
    }
    tuple
}
