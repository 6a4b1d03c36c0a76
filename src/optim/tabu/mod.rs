//! Tabu Search.
//!
//! Steepest-descent over full neighborhoods with a short-term memory of
//! visited solutions that forbids cycling back, plus a random jump when
//! the global best stops improving.
//!
//! # References
//!
//! - Glover (1989), "Tabu Search—Part I"
//! - Glover (1990), "Tabu Search—Part II"

mod config;
mod runner;

pub use config::TabuConfig;
pub use runner::{TabuResult, TabuRunner};
