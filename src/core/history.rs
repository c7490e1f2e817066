//! State transition history tracking.
//!
//! The engine records every applied transition into a bounded
//! [`StateHistory`] so hosts can inspect the recent path of the machine.

use super::event::Event;
use super::state::StateId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Record of a single applied transition.
///
/// `from` is `None` for the activation transition, which enters `Aborted`
/// from the inactive machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state being left
    pub from: Option<StateId>,
    /// The state being entered
    pub to: StateId,
    /// The event that caused the transition
    pub event: Event,
    /// When the transition was applied
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of state transitions.
///
/// Once `capacity` transitions are held, recording a new one evicts the
/// oldest.
///
/// # Example
///
/// ```rust
/// use packml::core::{Event, StateHistory, StateId, StateTransition};
/// use chrono::Utc;
///
/// let mut history = StateHistory::with_capacity(8);
/// history.record(StateTransition {
///     from: None,
///     to: StateId::Aborted,
///     event: Event::Activate,
///     timestamp: Utc::now(),
/// });
/// history.record(StateTransition {
///     from: Some(StateId::Aborted),
///     to: StateId::Clearing,
///     event: Event::Clear,
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec![StateId::Aborted, StateId::Clearing]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory {
    capacity: usize,
    transitions: VecDeque<StateTransition>,
}

impl Default for StateHistory {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl StateHistory {
    /// Create an empty history holding at most `capacity` transitions.
    ///
    /// A capacity of zero disables recording.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            transitions: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    /// Record a transition, evicting the oldest one when full.
    pub fn record(&mut self, transition: StateTransition) {
        if self.capacity == 0 {
            return;
        }
        while self.transitions.len() >= self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed.
    ///
    /// Starts with the `from` state of the oldest retained transition (when
    /// there is one), followed by the `to` state of every transition.
    pub fn get_path(&self) -> Vec<StateId> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(from) = self.transitions.front().and_then(|t| t.from) {
            path.push(from);
        }
        path.extend(self.transitions.iter().map(|t| t.to));
        path
    }

    /// Calculate total duration from first to last retained transition.
    ///
    /// Returns `None` if there are no transitions.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.front(), self.transitions.back()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    /// Iterate over retained transitions, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition> {
        self.transitions.iter()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
