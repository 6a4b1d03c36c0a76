//! Joint distribution under the conditional independence hypothesis.

use log::debug;

use crate::error::{Result, SynthError};
use crate::matrix::{NDimensionalMatrix, SegmentedMatrix};

/// Builds a joint from low-dimensional marginals assumed (conditionally)
/// independent.
///
/// Disjoint marginals give the plain product of their frequencies.
/// Overlapping marginals must agree on their shared attributes; each one is
/// then conditioned on the overlap before being multiplied in.
///
/// # Examples
///
/// ```
/// use u_synthpop::attribute::Attribute;
/// use u_synthpop::distribution::IndependenceHypothesis;
/// use u_synthpop::matrix::{Coordinate, NDimensionalMatrix};
///
/// let sex = Attribute::nominal("Sex", &["M", "F"]).unwrap();
/// let age = Attribute::nominal("Age", &["young", "old"]).unwrap();
/// let mut by_sex = NDimensionalMatrix::contingency("sex", vec![sex.clone()]);
/// by_sex.add_value(&Coordinate::of(&[(&sex, "M")]).unwrap(), 50.0).unwrap();
/// by_sex.add_value(&Coordinate::of(&[(&sex, "F")]).unwrap(), 50.0).unwrap();
/// let mut by_age = NDimensionalMatrix::contingency("age", vec![age.clone()]);
/// by_age.add_value(&Coordinate::of(&[(&age, "young")]).unwrap(), 40.0).unwrap();
/// by_age.add_value(&Coordinate::of(&[(&age, "old")]).unwrap(), 60.0).unwrap();
///
/// let joint = IndependenceHypothesis::build("joint", &[by_sex, by_age]).unwrap();
/// let c = Coordinate::of(&[(&sex, "M"), (&age, "old")]).unwrap();
/// assert!((joint.get_val(&c).unwrap().value() - 0.3).abs() < 1e-12);
/// ```
pub struct IndependenceHypothesis;

impl IndependenceHypothesis {
    /// Composes the marginals without materialising the joint.
    pub fn segmented(label: &str, marginals: &[NDimensionalMatrix]) -> Result<SegmentedMatrix> {
        if marginals.is_empty() {
            return Err(SynthError::InvalidDistribution(
                "independence hypothesis needs at least one marginal".into(),
            ));
        }
        SegmentedMatrix::new(label, marginals.to_vec())
    }

    /// Materialised, normalized joint frequency table.
    ///
    /// # Errors
    /// `InvalidDistribution` for an empty marginal list, an empty marginal,
    /// or overlapping marginals that disagree.
    pub fn build(label: &str, marginals: &[NDimensionalMatrix]) -> Result<NDimensionalMatrix> {
        let segmented = Self::segmented(label, marginals)?;
        let mut joint = segmented.materialize()?;
        joint.normalize()?;
        debug!(
            "independence joint '{}': {} marginals, {} non-zero cells",
            label,
            marginals.len(),
            joint.size()
        );
        Ok(joint)
    }
}
