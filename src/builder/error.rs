//! Build errors for engine construction.

use crate::core::StateId;
use thiserror::Error;

/// Errors that can occur when building an engine.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Throughput unit must be longer than zero")]
    ZeroThroughputUnit,

    #[error(
        "State '{from}' already handles Error by entering '{existing}', cannot also enter '{requested}'"
    )]
    ConflictingErrorTransition {
        from: StateId,
        existing: StateId,
        requested: StateId,
    },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}
