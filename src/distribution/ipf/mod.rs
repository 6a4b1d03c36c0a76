//! Iterative Proportional Fitting (IPF).
//!
//! Rescales a seed table until its marginals match a set of control
//! tables, preserving the seed's interaction structure.
//!
//! # References
//!
//! - Deming & Stephan (1940), "On a least squares adjustment of a sampled
//!   frequency table when the expected marginal totals are known"
//! - Beckman, Baggerly & McKay (1996), "Creating synthetic baseline
//!   populations"

mod config;
mod runner;

pub use config::IpfConfig;
pub use runner::{IpfResult, IterativeProportionalFitting};
