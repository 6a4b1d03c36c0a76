//! Alias-method sampler.
//!
//! # Reference
//!
//! Vose, M. D. (1991). "A linear algorithm for generating random numbers
//! with a given distribution", *IEEE Trans. Software Engineering* 17(9).

use rand::Rng;

use super::types::{Distribution, Sampler};
use crate::error::{Result, SynthError};
use crate::matrix::Coordinate;

/// Vose alias table over indices `0..n`.
#[derive(Debug, Clone)]
pub(crate) struct AliasTable {
    probability: Vec<f64>,
    alias: Vec<usize>,
}

impl AliasTable {
    /// O(n) construction from unnormalized, non-negative weights.
    pub(crate) fn new(weights: &[f64]) -> Result<Self> {
        let n = weights.len();
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(SynthError::InvalidDistribution(
                "alias table weights must be finite and non-negative".into(),
            ));
        }
        let total: f64 = weights.iter().sum();
        if n == 0 || total <= 0.0 {
            return Err(SynthError::InvalidDistribution(
                "alias table needs positive total weight".into(),
            ));
        }

        let mut scaled: Vec<f64> = weights.iter().map(|w| w * n as f64 / total).collect();
        let mut probability = vec![1.0; n];
        let mut alias: Vec<usize> = (0..n).collect();
        let (mut small, mut large): (Vec<usize>, Vec<usize>) =
            (0..n).partition(|&i| scaled[i] < 1.0);

        while let (Some(&s), Some(&l)) = (small.last(), large.last()) {
            small.pop();
            large.pop();
            probability[s] = scaled[s];
            alias[s] = l;
            scaled[l] += scaled[s] - 1.0;
            if scaled[l] < 1.0 {
                small.push(l);
            } else {
                large.push(l);
            }
        }
        // leftovers are 1 up to rounding
        for i in small.into_iter().chain(large) {
            probability[i] = 1.0;
        }

        Ok(Self { probability, alias })
    }

    pub(crate) fn len(&self) -> usize {
        self.probability.len()
    }

    /// O(1) draw of an index.
    pub(crate) fn sample<R: Rng>(&self, rng: &mut R) -> usize {
        let column = rng.random_range(0..self.probability.len());
        if rng.random::<f64>() < self.probability[column] {
            column
        } else {
            self.alias[column]
        }
    }
}

/// O(n) setup, O(1) per draw. The sampler for bulk generation.
///
/// # Examples
///
/// ```
/// use u_synthpop::attribute::Attribute;
/// use u_synthpop::matrix::{Coordinate, NDimensionalMatrix};
/// use u_synthpop::sampler::{AliasSampler, Distribution, Sampler};
/// use u_numflow::random::create_rng;
///
/// let sex = Attribute::nominal("Sex", &["M", "F"]).unwrap();
/// let mut m = NDimensionalMatrix::contingency("sex", vec![sex.clone()]);
/// m.add_value(&Coordinate::of(&[(&sex, "M")]).unwrap(), 1.0).unwrap();
///
/// let sampler = AliasSampler::new(Distribution::from_view(&m).unwrap()).unwrap();
/// let mut rng = create_rng(42);
/// let drawn = sampler.draw(&mut rng).unwrap();
/// assert_eq!(drawn, Coordinate::of(&[(&sex, "M")]).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct AliasSampler {
    table: Option<(Distribution, AliasTable)>,
}

impl AliasSampler {
    pub fn new(distribution: Distribution) -> Result<Self> {
        let mut sampler = Self::default();
        sampler.configure(distribution)?;
        Ok(sampler)
    }

    pub fn configure(&mut self, distribution: Distribution) -> Result<()> {
        let table = AliasTable::new(distribution.probabilities())?;
        self.table = Some((distribution, table));
        Ok(())
    }

    pub fn distribution(&self) -> Option<&Distribution> {
        self.table.as_ref().map(|(d, _)| d)
    }
}

impl Sampler for AliasSampler {
    type Output = Coordinate;

    fn draw<R: Rng>(&self, rng: &mut R) -> Result<Coordinate> {
        let (distribution, table) = self
            .table
            .as_ref()
            .ok_or(SynthError::Unconfigured("AliasSampler"))?;
        Ok(distribution.coordinates()[table.sample(rng)].clone())
    }
}
