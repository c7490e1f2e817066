//! Builder API for engine construction.
//!
//! [`EngineBuilder`] assembles an [`Engine`](crate::engine::Engine) from an
//! [`EngineConfig`] plus the pieces that cannot be serialized: notifier,
//! logger, state actions and `Error` rows.

pub mod config;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::EngineBuilder;
pub use error::BuildError;
