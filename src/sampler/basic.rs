//! Linear-scan sampler.

use rand::Rng;

use super::types::{Distribution, Sampler};
use crate::error::{Result, SynthError};
use crate::matrix::Coordinate;

/// Cumulative table searched linearly: O(n) per draw.
///
/// The simplest correct sampler; the other samplers are checked against it.
#[derive(Debug, Clone, Default)]
pub struct BasicSampler {
    table: Option<(Distribution, Vec<f64>)>,
}

impl BasicSampler {
    pub fn new(distribution: Distribution) -> Self {
        let mut sampler = Self::default();
        sampler.configure(distribution);
        sampler
    }

    pub fn configure(&mut self, distribution: Distribution) {
        let cumulative = distribution.cumulative();
        self.table = Some((distribution, cumulative));
    }

    pub fn distribution(&self) -> Option<&Distribution> {
        self.table.as_ref().map(|(d, _)| d)
    }
}

impl Sampler for BasicSampler {
    type Output = Coordinate;

    fn draw<R: Rng>(&self, rng: &mut R) -> Result<Coordinate> {
        let (distribution, cumulative) = self
            .table
            .as_ref()
            .ok_or(SynthError::Unconfigured("BasicSampler"))?;
        let u: f64 = rng.random();
        let index = cumulative
            .iter()
            .position(|&c| u < c)
            .unwrap_or(cumulative.len() - 1);
        Ok(distribution.coordinates()[index].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use u_numflow::random::create_rng;

    #[test]
    fn test_unconfigured() {
        let mut rng = create_rng(1);
        let err = BasicSampler::default().draw(&mut rng).unwrap_err();
        assert_eq!(err, SynthError::Unconfigured("BasicSampler"));
        assert!(err.is_usage());
    }
}
