//! Binary-search sampler.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use u_numflow::random::WeightedSampler;

use super::types::{Distribution, Sampler};
use crate::error::{Result, SynthError};
use crate::matrix::Coordinate;

/// Cumulative table over the distribution's coordinates, searched by
/// bisection: O(log n) per draw.
#[derive(Clone, Default)]
pub struct BinarySampler {
    table: Option<(Distribution, Arc<WeightedSampler>)>,
}

impl BinarySampler {
    pub fn new(distribution: Distribution) -> Result<Self> {
        let mut sampler = Self::default();
        sampler.configure(distribution)?;
        Ok(sampler)
    }

    pub fn configure(&mut self, distribution: Distribution) -> Result<()> {
        let weights = WeightedSampler::new(distribution.probabilities()).ok_or_else(|| {
            SynthError::InvalidDistribution("binary sampler needs positive mass".into())
        })?;
        self.table = Some((distribution, Arc::new(weights)));
        Ok(())
    }

    pub fn distribution(&self) -> Option<&Distribution> {
        self.table.as_ref().map(|(d, _)| d)
    }
}

impl fmt::Debug for BinarySampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinarySampler")
            .field("distribution", &self.distribution())
            .finish()
    }
}

impl Sampler for BinarySampler {
    type Output = Coordinate;

    fn draw<R: Rng>(&self, rng: &mut R) -> Result<Coordinate> {
        let (distribution, weights) = self
            .table
            .as_ref()
            .ok_or(SynthError::Unconfigured("BinarySampler"))?;
        let index = weights.sample(rng);
        Ok(distribution.coordinates()[index].clone())
    }
}
