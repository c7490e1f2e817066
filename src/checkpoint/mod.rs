//! Checkpoints of the cumulative statistics.
//!
//! A [`StatsCheckpoint`] lets a host persist counters across restarts and
//! feed them back through [`Engine::restore_stats`](crate::engine::Engine::restore_stats).
//! Derived OEE fields travel with the snapshot but are recomputed on load.

use crate::stats::{check_baseline, StatsSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable checkpoint of the cumulative statistics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatsCheckpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Cumulative statistics at checkpoint time
    pub snapshot: StatsSnapshot,
}

impl StatsCheckpoint {
    pub fn new(snapshot: StatsSnapshot) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            snapshot,
        }
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.verify()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.verify()
    }

    /// Reject unknown versions and snapshots `load_stats` would refuse.
    fn verify(self) -> Result<Self, CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }
        check_baseline(&self.snapshot)?;
        Ok(self)
    }
}
