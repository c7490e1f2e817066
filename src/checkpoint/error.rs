//! Checkpoint error types.

use crate::stats::StatsError;
use thiserror::Error;

/// Errors raised while writing or reading a stats checkpoint
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The checkpoint could not be encoded as JSON or bincode
    #[error("Failed to encode stats checkpoint: {0}")]
    SerializationFailed(String),

    /// The bytes or text are not a stats checkpoint
    #[error("Failed to decode stats checkpoint: {0}")]
    DeserializationFailed(String),

    /// Written by a format this build cannot read
    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Decoded, but the snapshot would be rejected as a stats baseline
    #[error("Checkpoint snapshot is not a valid baseline: {0}")]
    InvalidSnapshot(#[from] StatsError),
}
