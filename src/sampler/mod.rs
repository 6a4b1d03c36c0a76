//! Samplers over frequency matrices and entity samples.
//!
//! | Sampler | Setup | Draw |
//! |---------|-------|------|
//! | [`BasicSampler`] | O(n) | O(n) |
//! | [`BinarySampler`] | O(n) | O(log n) |
//! | [`AliasSampler`] | O(n) | O(1) |
//! | [`HierarchicalSampler`] | one inner sampler per table | one draw per attribute |
//! | [`EntitySampler`] | O(sample) | O(1) |

mod alias;
mod basic;
mod binary;
mod coordinate;
mod entity;
mod hierarchical;
mod types;

pub use alias::AliasSampler;
pub use basic::BasicSampler;
pub use binary::BinarySampler;
pub use coordinate::{CoordinateSampler, SamplerKind};
pub use entity::EntitySampler;
pub use hierarchical::HierarchicalSampler;
pub use types::{Distribution, Sampler};
