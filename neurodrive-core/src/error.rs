//! Error taxonomy for the neurodrive workspace
//!
//! Every validation failure is surfaced immediately to the caller; nothing
//! is retried. A stalled evaluation harness is not an error the engine can
//! observe, it simply leaves the engine parked mid-cycle.

use thiserror::Error;

/// Errors produced by the neurodrive crates.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Malformed construction parameters: mismatched lengths, inverted
    /// ranges, an intermediate population too small for an operator.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A serialized genotype that does not parse back into a parameter
    /// vector.
    #[error("malformed genotype data: {0}")]
    Format(String),

    /// Filesystem failure while persisting or loading a genotype.
    #[error("genotype i/o failed")]
    Io(#[from] std::io::Error),

    /// The evaluation lifecycle was driven out of order, e.g. a completion
    /// call with no outstanding evaluation.
    #[error("evaluation lifecycle violation: {0}")]
    ContractViolation(String),
}

pub type Result<T> = std::result::Result<T, EvolutionError>;
