//! Fitness indicators.
//!
//! Compare a candidate population (tabulated into a contingency table) with
//! objective matrices. All indicators are zero on a perfect fit and grow
//! with the disagreement.
//!
//! # References
//!
//! - Voas & Williamson (2001), "Evaluating goodness-of-fit measures for
//!   synthetic microdata"
//! - Wilson & Hilferty (1931), "The distribution of chi-square"

mod critical;
mod evaluator;
mod indicator;

pub use critical::chi_squared_critical;
pub use evaluator::FitnessEvaluator;
pub use indicator::Indicator;
