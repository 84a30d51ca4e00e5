use grid_chase_core::{CellCoord, GridWorld, InferenceConfig};
use grid_chase_system_inference::{
    Belief, ExactInference, Inference, InferenceError, JointParticleFilter, ParticleFilter,
};
use rand::Rng;

use crate::FilterKind;

/// Filters for every chaser of a layout behind one stepping interface.
///
/// Exact and particle tracking run one independent filter per chaser; the
/// joint filter tracks them all at once.
#[derive(Debug)]
pub(crate) enum Tracker {
    Exact(Vec<ExactInference>),
    Particle(Vec<ParticleFilter>),
    Joint(JointParticleFilter),
}

impl Tracker {
    pub(crate) fn new<R>(
        kind: FilterKind,
        grid: &GridWorld,
        chasers: usize,
        config: &InferenceConfig,
        rng: &mut R,
    ) -> Result<Self, InferenceError>
    where
        R: Rng + ?Sized,
    {
        Ok(match kind {
            FilterKind::Exact => Self::Exact(
                (0..chasers)
                    .map(|_| ExactInference::new(grid, config.clone()))
                    .collect::<Result<_, _>>()?,
            ),
            FilterKind::Particle => Self::Particle(
                (0..chasers)
                    .map(|_| ParticleFilter::new(grid, config.clone(), rng))
                    .collect::<Result<_, _>>()?,
            ),
            FilterKind::Joint => {
                Self::Joint(JointParticleFilter::new(grid, chasers, config.clone(), rng)?)
            }
        })
    }

    pub(crate) fn observe<R>(&mut self, readings: &[Option<u32>], seeker: CellCoord, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Exact(filters) => observe_each(filters, readings, seeker, rng),
            Self::Particle(filters) => observe_each(filters, readings, seeker, rng),
            Self::Joint(filter) => filter.observe(readings, seeker, rng),
        }
    }

    pub(crate) fn elapse_time<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        match self {
            Self::Exact(filters) => elapse_each(filters, rng),
            Self::Particle(filters) => elapse_each(filters, rng),
            Self::Joint(filter) => filter.elapse_time(rng),
        }
    }

    /// One belief per chaser, in layout order.
    pub(crate) fn beliefs(&self) -> Vec<Belief> {
        match self {
            Self::Exact(filters) => filters.iter().map(Inference::belief).collect(),
            Self::Particle(filters) => filters.iter().map(Inference::belief).collect(),
            Self::Joint(filter) => filter.marginals(),
        }
    }
}

fn observe_each<F, R>(filters: &mut [F], readings: &[Option<u32>], seeker: CellCoord, rng: &mut R)
where
    F: Inference,
    R: Rng + ?Sized,
{
    for (index, filter) in filters.iter_mut().enumerate() {
        let reading = readings.get(index).copied().flatten();
        filter.observe(reading, seeker, rng);
    }
}

fn elapse_each<F, R>(filters: &mut [F], rng: &mut R)
where
    F: Inference,
    R: Rng + ?Sized,
{
    for filter in filters {
        filter.elapse_time(rng);
    }
}
