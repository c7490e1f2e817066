//! Serializable engine configuration.
//!
//! Fields missing from the source fall back to their defaults.

use super::error::BuildError;
use crate::graph::CycleMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables an [`EngineBuilder`](super::EngineBuilder) starts from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Transition graph variant.
    #[serde(default)]
    pub cycle_mode: CycleMode,

    /// Maximum number of transitions kept in the history; 0 disables it.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Time unit throughput is extrapolated to, in seconds.
    #[serde(default = "default_throughput_unit_secs")]
    pub throughput_unit_secs: u64,
}

fn default_history_capacity() -> usize {
    256
}

// Throughput per minute.
fn default_throughput_unit_secs() -> u64 {
    60
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cycle_mode: CycleMode::default(),
            history_capacity: default_history_capacity(),
            throughput_unit_secs: default_throughput_unit_secs(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn throughput_unit(&self) -> Duration {
        Duration::from_secs(self.throughput_unit_secs)
    }
}
