//! Engine error types.

use crate::core::StateId;
use thiserror::Error;

/// Errors that can surface from engine commands
///
/// Illegal commands are not errors; they return `Ok(false)`.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The transition-processing thread could not be started
    #[error("Failed to spawn the transition-processing thread: {0}")]
    ProcessorSpawn(#[source] std::io::Error),

    /// The action of an entered state could not be scheduled, so the state
    /// would never report completion
    #[error("Failed to schedule the action of state '{state}': {source}")]
    ActionSpawn {
        state: StateId,
        #[source]
        source: std::io::Error,
    },

    /// The transition-processing thread stopped before answering
    #[error("Transition-processing thread is no longer running")]
    Disconnected,
}
