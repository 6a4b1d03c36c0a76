//! Hill Climbing.
//!
//! Accepts only strictly improving neighbors. Cheap per iteration and
//! monotone, but stops improving at the first local optimum.

mod config;
mod runner;

pub use config::HillClimbingConfig;
pub use runner::{HillClimbingResult, HillClimbingRunner};
