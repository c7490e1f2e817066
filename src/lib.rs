//! PackML: a packaging-machine state model engine with OEE statistics.
//!
//! The engine implements the 17 states of the PackML state model, the
//! command vocabulary that moves between them, and per-state duration
//! tracking feeding Overall Equipment Effectiveness metrics.
//!
//! # Core Concepts
//!
//! - **States and events**: [`StateId`] and [`Event`] in [`core`]
//! - **Transition graph**: a fixed table per [`CycleMode`], see [`graph`]
//! - **Engine**: one transition-processing thread, state actions on their
//!   own threads, see [`engine`]
//! - **Statistics**: cumulative and transactional snapshots, see [`stats`]
//!
//! # Example
//!
//! ```rust
//! use packml::builder::EngineBuilder;
//! use packml::core::StateId;
//! use packml::notify::StateRecorder;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let recorder = Arc::new(StateRecorder::new());
//! let engine = EngineBuilder::new()
//!     .notifier(Arc::clone(&recorder))
//!     .execute(|| 0)
//!     .build()
//!     .unwrap();
//!
//! engine.activate().unwrap();
//! engine.clear().unwrap();
//! assert!(recorder.wait_for(StateId::Stopped, Duration::from_secs(5)));
//!
//! engine.reset().unwrap();
//! assert!(recorder.wait_for(StateId::Idle, Duration::from_secs(5)));
//!
//! engine.start().unwrap();
//! assert!(recorder.wait_for(StateId::Complete, Duration::from_secs(5)));
//! engine.increment_success_count();
//!
//! let stats = engine.current_incremental_stat_snapshot();
//! assert_eq!(stats.cycle_count, 1);
//! assert_eq!(stats.quality, 1.0);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod engine;
pub mod graph;
pub mod logging;
pub mod notify;
pub mod stats;

// Re-export commonly used types
pub use builder::{BuildError, EngineBuilder, EngineConfig};
pub use checkpoint::{CheckpointError, StatsCheckpoint};
pub use crate::core::{Event, StateHistory, StateId, StateTransition};
pub use engine::{Engine, EngineError, ExitSignal};
pub use graph::{CycleMode, TransitionGraph};
pub use logging::{EngineLog, LogLevel, TracingLog};
pub use notify::{StateChangeNotifier, StateRecorder};
pub use stats::{StatsAggregator, StatsError, StatsItem, StatsSnapshot};
