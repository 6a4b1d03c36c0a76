//! Sampler contract and the discrete distribution samplers are built from.

use rand::Rng;

use crate::attribute::Attribute;
use crate::error::{Result, SynthError};
use crate::matrix::{Coordinate, MatrixView};

/// Draws random outcomes from a configured distribution.
///
/// Draws are independent. Samplers never deduplicate their output; see
/// [`EntitySampler::draw_unique`](super::EntitySampler::draw_unique) for
/// the distinct-object variant.
pub trait Sampler {
    /// What one draw produces.
    type Output;

    /// Draws one outcome.
    ///
    /// # Errors
    /// `Unconfigured` if the sampler has no distribution yet.
    fn draw<R: Rng>(&self, rng: &mut R) -> Result<Self::Output>;

    /// Draws `n` independent outcomes.
    fn draw_n<R: Rng>(&self, n: usize, rng: &mut R) -> Result<Vec<Self::Output>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.draw(rng)?);
        }
        Ok(out)
    }
}

/// Finite distribution over full coordinates.
///
/// Coordinates are kept in ascending order so that a seeded sampler built
/// from the same matrix always draws the same sequence.
#[derive(Debug, Clone)]
pub struct Distribution {
    dimensions: Vec<Attribute>,
    coordinates: Vec<Coordinate>,
    probabilities: Vec<f64>,
}

impl Distribution {
    /// Support of a matrix view.
    ///
    /// # Errors
    /// `InvalidDistribution` if the view has no positive mass.
    pub fn from_view<M: MatrixView + ?Sized>(view: &M) -> Result<Self> {
        Self::from_weights(view.dimensions().to_vec(), view.support()?)
    }

    /// Builds a distribution from unnormalized weights; zero weights are
    /// dropped.
    ///
    /// # Errors
    /// `InvalidDistribution` on a negative or non-finite weight, or when
    /// the weights sum to zero.
    pub fn from_weights(dimensions: Vec<Attribute>, weights: Vec<(Coordinate, f64)>) -> Result<Self> {
        let mut total = 0.0;
        for (coordinate, w) in &weights {
            if !w.is_finite() || *w < 0.0 {
                return Err(SynthError::InvalidDistribution(format!(
                    "weight {w} at {coordinate} is not a valid probability mass"
                )));
            }
            total += w;
        }
        if total <= 0.0 {
            return Err(SynthError::InvalidDistribution(
                "distribution has no positive mass".into(),
            ));
        }
        let mut weights: Vec<(Coordinate, f64)> =
            weights.into_iter().filter(|(_, w)| *w > 0.0).collect();
        weights.sort_by(|a, b| a.0.cmp(&b.0));
        let (coordinates, probabilities) = weights
            .into_iter()
            .map(|(c, w)| (c, w / total))
            .unzip();
        Ok(Self {
            dimensions,
            coordinates,
            probabilities,
        })
    }

    pub fn dimensions(&self) -> &[Attribute] {
        &self.dimensions
    }

    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    /// Running sums of the probabilities; the last entry is forced to 1.
    pub(crate) fn cumulative(&self) -> Vec<f64> {
        let mut acc = 0.0;
        let mut cumulative: Vec<f64> = self
            .probabilities
            .iter()
            .map(|p| {
                acc += p;
                acc
            })
            .collect();
        if let Some(last) = cumulative.last_mut() {
            *last = 1.0;
        }
        cumulative
    }
}
