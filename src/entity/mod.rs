//! Entities and populations.
//!
//! Entities are immutable value bags with an identity; populations are the
//! only mutable structure, changed through explicit add / remove pairs.

mod population;
mod types;

pub use population::Population;
pub use types::{Entity, EntityId};
