//! Error type shared by every module of the crate.
//!
//! Only fatal conditions are errors. Expected outcomes of iterative or
//! stochastic processes (IPF non-convergence, optimizer stalls) are
//! reported through result structs instead.

use thiserror::Error;

use crate::entity::EntityId;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SynthError>;

/// Errors raised by matrices, builders, samplers and optimizers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    /// A coordinate names an attribute that the matrix does not span.
    #[error("attribute '{attribute}' is not a dimension of {matrix}")]
    UnknownDimension { attribute: String, matrix: String },

    /// A label does not belong to the attribute's value space.
    #[error("value '{value}' does not belong to attribute '{attribute}'")]
    UnknownValue { attribute: String, value: String },

    /// A value space already holds this label.
    #[error("value '{value}' is already defined for attribute '{attribute}'")]
    DuplicateValue { attribute: String, value: String },

    /// A sampler was asked to draw before being given a distribution.
    #[error("{0} has no distribution configured")]
    Unconfigured(&'static str),

    /// A hierarchical draw reached a parent value without conditional mass.
    #[error("no conditional mass for '{attribute}' given parent value '{parent_value}'")]
    ZeroConditionalMass {
        attribute: String,
        parent_value: String,
    },

    /// A neighbor shift tried to remove an entity the population lacks.
    #[error("entity {0} is not part of the population")]
    EntityNotFound(EntityId),

    /// Any other misuse of the API.
    #[error("usage error: {0}")]
    Usage(String),

    /// Marginals or seeds that cannot produce a proper distribution.
    #[error("invalid distribution: {0}")]
    InvalidDistribution(String),

    /// A configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SynthError {
    /// Returns `true` for the fatal usage-error family.
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            SynthError::UnknownDimension { .. }
                | SynthError::UnknownValue { .. }
                | SynthError::DuplicateValue { .. }
                | SynthError::Unconfigured(_)
                | SynthError::ZeroConditionalMass { .. }
                | SynthError::EntityNotFound(_)
                | SynthError::Usage(_)
        )
    }
}
