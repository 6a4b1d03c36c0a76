//! Combinatorial optimization of synthetic populations.
//!
//! A population drawn from a sample is improved by swapping entities
//! against aggregated objectives. The runners are generic over
//! [`SearchProblem`]:
//!
//! - [`HillClimbingRunner`]: accept strictly improving neighbors only.
//! - [`TabuRunner`]: best non-tabu neighbor with stall diversification.
//! - [`SaRunner`]: Metropolis acceptance under a cooling schedule.
//!
//! [`PopulationProblem`] optimizes one population; [`MultiLayerProblem`]
//! optimizes several named layers against their own objectives.

mod annealing;
mod hill_climbing;
mod multi_layer;
mod neighbor;
mod problem;
mod tabu;
mod types;

pub use annealing::{CoolingSchedule, SaConfig, SaResult, SaRunner};
pub use hill_climbing::{HillClimbingConfig, HillClimbingResult, HillClimbingRunner};
pub use multi_layer::{MultiLayerProblem, MultiLayerSolution};
pub use neighbor::{PopulationNeighborSearch, ShiftPolicy};
pub use problem::PopulationProblem;
pub use tabu::{TabuConfig, TabuResult, TabuRunner};
pub use types::{SearchProblem, Solution};
