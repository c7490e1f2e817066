//! Queue of visited states for hosts that observe progression.

use super::StateChangeNotifier;
use crate::core::StateId;
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Notifier that queues every entered state.
///
/// Commands only report whether they were accepted; the states they lead
/// through are observed here, in entry order.
///
/// # Example
///
/// ```rust
/// use packml::core::StateId;
/// use packml::notify::{StateChangeNotifier, StateRecorder};
/// use std::time::Duration;
///
/// let recorder = StateRecorder::new();
/// recorder.state_changed("Aborted", StateId::Aborted);
/// recorder.state_changed("Clearing", StateId::Clearing);
///
/// assert!(recorder.wait_for(StateId::Clearing, Duration::from_millis(10)));
/// assert!(recorder.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct StateRecorder {
    visited: Mutex<VecDeque<StateId>>,
    changed: Condvar,
}

impl StateRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pop the oldest unread state, waiting up to `timeout` for one.
    ///
    /// A timeout too large to represent as a deadline waits indefinitely.
    pub fn next_state(&self, timeout: Duration) -> Option<StateId> {
        let deadline = Instant::now().checked_add(timeout);
        let mut visited = self.lock();
        loop {
            if let Some(state) = visited.pop_front() {
                return Some(state);
            }
            visited = match deadline {
                Some(deadline) => {
                    let remaining = deadline.checked_duration_since(Instant::now())?;
                    self.changed
                        .wait_timeout(visited, remaining)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
                None => self
                    .changed
                    .wait(visited)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    /// Consume visited states until `state` is seen.
    ///
    /// States entered on the way are discarded. Returns `false` if `state`
    /// was not entered within `timeout`.
    pub fn wait_for(&self, state: StateId, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => Duration::MAX,
            };
            match self.next_state(remaining) {
                Some(next) if next == state => return true,
                Some(_) => continue,
                None => return false,
            }
        }
    }

    /// Take every unread state.
    pub fn drain(&self) -> Vec<StateId> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<StateId>> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateChangeNotifier for StateRecorder {
    fn state_changed(&self, _name: &str, id: StateId) {
        self.lock().push_back(id);
        self.changed.notify_all();
    }
}
