//! Distribution builders.
//!
//! Turn partial evidence (marginals, seeds, conditional tables) into a
//! full joint distribution:
//!
//! - [`IndependenceHypothesis`]: product of (conditionally) independent
//!   marginals.
//! - [`IterativeProportionalFitting`]: fits a seed to marginal controls.
//! - [`HierarchicalHypothesis`]: a dependency tree of conditional tables.

mod hierarchical;
mod independence;
mod ipf;

pub use hierarchical::{DependencyTree, HierarchicalHypothesis};
pub use independence::IndependenceHypothesis;
pub use ipf::{IpfConfig, IpfResult, IterativeProportionalFitting};
