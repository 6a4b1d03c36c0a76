//! Closed set of coordinate samplers, chosen at runtime.

use rand::Rng;

use super::alias::AliasSampler;
use super::basic::BasicSampler;
use super::binary::BinarySampler;
use super::types::{Distribution, Sampler};
use crate::attribute::Attribute;
use crate::error::Result;
use crate::matrix::{Coordinate, MatrixView};

/// Which coordinate sampler to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SamplerKind {
    /// Linear scan, O(n) per draw.
    Basic,
    /// Bisection, O(log n) per draw.
    Binary,
    /// Vose alias table, O(1) per draw.
    #[default]
    Alias,
}

impl SamplerKind {
    pub fn build(self, distribution: Distribution) -> Result<CoordinateSampler> {
        Ok(match self {
            SamplerKind::Basic => CoordinateSampler::Basic(BasicSampler::new(distribution)),
            SamplerKind::Binary => CoordinateSampler::Binary(BinarySampler::new(distribution)?),
            SamplerKind::Alias => CoordinateSampler::Alias(AliasSampler::new(distribution)?),
        })
    }

    pub fn from_view<M: MatrixView + ?Sized>(self, view: &M) -> Result<CoordinateSampler> {
        self.build(Distribution::from_view(view)?)
    }
}

/// One of the flat coordinate samplers.
#[derive(Debug, Clone)]
pub enum CoordinateSampler {
    Basic(BasicSampler),
    Binary(BinarySampler),
    Alias(AliasSampler),
}

impl CoordinateSampler {
    pub fn kind(&self) -> SamplerKind {
        match self {
            CoordinateSampler::Basic(_) => SamplerKind::Basic,
            CoordinateSampler::Binary(_) => SamplerKind::Binary,
            CoordinateSampler::Alias(_) => SamplerKind::Alias,
        }
    }

    pub fn distribution(&self) -> Option<&Distribution> {
        match self {
            CoordinateSampler::Basic(s) => s.distribution(),
            CoordinateSampler::Binary(s) => s.distribution(),
            CoordinateSampler::Alias(s) => s.distribution(),
        }
    }

    /// Attributes of the drawn coordinates (empty when unconfigured).
    pub fn dimensions(&self) -> &[Attribute] {
        self.distribution().map_or(&[], Distribution::dimensions)
    }
}

impl Sampler for CoordinateSampler {
    type Output = Coordinate;

    fn draw<R: Rng>(&self, rng: &mut R) -> Result<Coordinate> {
        match self {
            CoordinateSampler::Basic(s) => s.draw(rng),
            CoordinateSampler::Binary(s) => s.draw(rng),
            CoordinateSampler::Alias(s) => s.draw(rng),
        }
    }
}
