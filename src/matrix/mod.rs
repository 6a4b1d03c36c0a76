//! Sparse multi-dimensional contingency and frequency matrices.
//!
//! - [`Coordinate`]: attribute-value sets addressing cells (partial
//!   coordinates are marginal queries).
//! - [`Cell`]: a count or a frequency.
//! - [`NDimensionalMatrix`]: sparse coordinate → cell storage.
//! - [`SegmentedMatrix`]: a joint composed of conditionally independent
//!   sub-matrices.
//! - [`MatrixView`]: the read-only probability interface samplers consume.

mod cell;
mod contingency;
mod coordinate;
mod ndmatrix;
mod segmented;
mod view;

pub use cell::{Cell, MatrixKind};
pub use coordinate::Coordinate;
pub use ndmatrix::{NDimensionalMatrix, FREQUENCY_EPSILON};
pub use segmented::SegmentedMatrix;
pub use view::MatrixView;
