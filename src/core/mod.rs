//! Core PackML vocabulary.
//!
//! This module contains the plain data the engine is built from:
//! - The seventeen states via [`StateId`]
//! - Commands and action outcomes via [`Event`]
//! - Bounded transition history
//!
//! Nothing in here spawns threads or takes locks.

mod event;
mod history;
mod state;

pub use event::Event;
pub use history::{StateHistory, StateTransition};
pub use state::{DurationCategory, StateId};
