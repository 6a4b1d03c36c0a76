//! Synthetic population engine.
//!
//! Turns partial statistical evidence into synthetic populations:
//!
//! - **Attributes** ([`attribute`]): named value spaces (nominal, ordinal,
//!   integer, continuous, range, boolean, aggregated, mapped).
//! - **Matrices** ([`matrix`]): sparse contingency and frequency tables
//!   addressed by attribute-value coordinates, with marginal queries and
//!   segmented (conditionally independent) joints.
//! - **Distribution builders** ([`distribution`]): independence
//!   hypothesis, Iterative Proportional Fitting and hierarchical
//!   dependency trees.
//! - **Samplers** ([`sampler`]): linear, binary-search and alias-method
//!   draws over a joint, tree-ordered conditional draws, and weighted
//!   resampling of micro-data.
//! - **Generation** ([`generator`]): seeded population construction from
//!   any sampler.
//! - **Fitness** ([`fitness`]): TAE, AAPD, SRMSE and RSSZ* between
//!   objective tables and a population.
//! - **Optimization** ([`optim`]): Hill Climbing, Tabu Search and
//!   Simulated Annealing over entity shifts drawn from a sample, for one
//!   population or several layers at once.
//!
//! # Example
//!
//! ```
//! use u_synthpop::attribute::Attribute;
//! use u_synthpop::distribution::{IpfConfig, IterativeProportionalFitting};
//! use u_synthpop::generator::PopulationGenerator;
//! use u_synthpop::matrix::{Coordinate, NDimensionalMatrix};
//! use u_synthpop::sampler::SamplerKind;
//!
//! let sex = Attribute::nominal("Sex", &["M", "F"]).unwrap();
//! let age = Attribute::ordinal("Age", &["young", "old"]).unwrap();
//!
//! let mut seed = NDimensionalMatrix::contingency("seed", vec![sex.clone(), age.clone()]);
//! for c in Coordinate::enumerate(&[sex.clone(), age.clone()]) {
//!     seed.set_value(&c, 1.0).unwrap();
//! }
//! let mut by_age = NDimensionalMatrix::frequency("age", vec![age.clone()]);
//! by_age.set_value(&Coordinate::of(&[(&age, "young")]).unwrap(), 0.4).unwrap();
//! by_age.set_value(&Coordinate::of(&[(&age, "old")]).unwrap(), 0.6).unwrap();
//!
//! let fitted = IterativeProportionalFitting::run(&seed, &[by_age], &IpfConfig::default()).unwrap();
//! assert!(fitted.converged);
//!
//! let generator = PopulationGenerator::from_view(&fitted.matrix, SamplerKind::Alias).unwrap();
//! let population = generator.generate_seeded(1_000, 7).unwrap();
//! assert_eq!(population.len(), 1_000);
//! ```

pub mod attribute;
pub mod distribution;
pub mod entity;
pub mod error;
pub mod fitness;
pub mod generator;
pub mod matrix;
pub mod optim;
pub mod sampler;

pub use error::{Result, SynthError};
