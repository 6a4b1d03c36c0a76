//! Read-only probability view shared by full and segmented matrices.

use super::coordinate::Coordinate;
use crate::attribute::Attribute;
use crate::error::Result;

/// A joint distribution that can be queried and enumerated.
///
/// Samplers and builders only need this view, so they accept both a
/// materialised [`NDimensionalMatrix`](super::NDimensionalMatrix) and a
/// [`SegmentedMatrix`](super::SegmentedMatrix).
pub trait MatrixView {
    /// Attributes spanned by the distribution, sorted by name.
    fn dimensions(&self) -> &[Attribute];

    /// Probability of a (possibly partial) coordinate.
    fn probability(&self, coordinate: &Coordinate) -> Result<f64>;

    /// Every full coordinate with positive probability, in ascending
    /// coordinate order, with probabilities summing to one.
    fn support(&self) -> Result<Vec<(Coordinate, f64)>>;
}
