//! State change notification.
//!
//! A [`StateChangeNotifier`] is handed to the engine at construction and is
//! called synchronously on every state entry, before that state's action is
//! dispatched. It runs on the transition-processing thread: it must return
//! quickly and must not wait on the engine.

mod recorder;

pub use recorder::StateRecorder;

use crate::core::StateId;

/// Capability invoked on every state entry with the state's name and id.
pub trait StateChangeNotifier: Send + Sync {
    fn state_changed(&self, name: &str, id: StateId);
}

impl<F> StateChangeNotifier for F
where
    F: Fn(&str, StateId) + Send + Sync,
{
    fn state_changed(&self, name: &str, id: StateId) {
        self(name, id)
    }
}
