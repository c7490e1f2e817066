//! The PackML engine: state lifecycle, event queue and command surface.
//!
//! An [`Engine`] owns one descriptor per [`StateId`](crate::core::StateId).
//! Entering a state starts its timer and runs its action on a dedicated
//! thread; leaving it raises the state's exit flag and joins that thread
//! before the next state is entered. All commands and action outcomes pass
//! through one queue drained by a single transition-processing thread.

mod descriptor;
pub mod error;
mod machine;
mod processor;

pub use descriptor::{ExitSignal, StateAction};
pub use error::EngineError;
pub use machine::Engine;
