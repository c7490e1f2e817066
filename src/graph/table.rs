//! Explicit (state, event) → state transition table.

use super::CycleMode;
use crate::core::{Event, StateId};
use std::collections::HashMap;

/// States from which `Stop` is accepted.
const STOPPABLE: [StateId; 12] = [
    StateId::Resetting,
    StateId::Idle,
    StateId::Starting,
    StateId::Execute,
    StateId::Holding,
    StateId::Held,
    StateId::Unholding,
    StateId::Suspending,
    StateId::Suspended,
    StateId::Unsuspending,
    StateId::Completing,
    StateId::Complete,
];

/// Transition table for one cycle mode.
///
/// Every lookup is a single map probe; a missing row means the event is
/// ignored in that state. `Activate` and `Deactivate` never have rows, the
/// engine handles them around the table.
///
/// # Example
///
/// ```rust
/// use packml::core::{Event, StateId};
/// use packml::graph::{CycleMode, TransitionGraph};
///
/// let graph = TransitionGraph::new(CycleMode::SingleCycle);
/// assert_eq!(
///     graph.next(StateId::Idle, Event::Start),
///     Some(StateId::Starting)
/// );
/// assert_eq!(graph.next(StateId::Idle, Event::Hold), None);
/// ```
#[derive(Clone, Debug)]
pub struct TransitionGraph {
    mode: CycleMode,
    rows: HashMap<(StateId, Event), StateId>,
}

impl TransitionGraph {
    /// Build the graph for `mode`.
    pub fn new(mode: CycleMode) -> Self {
        let mut graph = Self {
            mode,
            rows: HashMap::new(),
        };

        graph.insert(StateId::Aborted, Event::Clear, StateId::Clearing);
        graph.insert(StateId::Clearing, Event::StateComplete, StateId::Stopped);
        graph.insert(StateId::Stopped, Event::Reset, StateId::Resetting);
        graph.insert(StateId::Complete, Event::Reset, StateId::Resetting);
        graph.insert(StateId::Resetting, Event::StateComplete, StateId::Idle);
        graph.insert(StateId::Idle, Event::Start, StateId::Starting);
        graph.insert(StateId::Starting, Event::StateComplete, StateId::Execute);
        graph.insert(StateId::Execute, Event::Hold, StateId::Holding);
        graph.insert(StateId::Holding, Event::StateComplete, StateId::Held);
        graph.insert(StateId::Held, Event::Unhold, StateId::Unholding);
        graph.insert(StateId::Unholding, Event::StateComplete, StateId::Execute);
        graph.insert(StateId::Execute, Event::Suspend, StateId::Suspending);
        graph.insert(StateId::Suspending, Event::StateComplete, StateId::Suspended);
        graph.insert(StateId::Suspended, Event::Unsuspend, StateId::Unsuspending);
        graph.insert(StateId::Unsuspending, Event::StateComplete, StateId::Execute);
        graph.insert(StateId::Stopping, Event::StateComplete, StateId::Stopped);
        graph.insert(StateId::Aborting, Event::StateComplete, StateId::Aborted);

        for state in STOPPABLE {
            graph.insert(state, Event::Stop, StateId::Stopping);
        }
        for state in StateId::ALL {
            if !matches!(state, StateId::Aborting | StateId::Aborted) {
                graph.insert(state, Event::Abort, StateId::Aborting);
            }
        }

        match mode {
            CycleMode::SingleCycle => {
                graph.insert(StateId::Execute, Event::StateComplete, StateId::Completing);
                graph.insert(StateId::Completing, Event::StateComplete, StateId::Complete);
            }
            CycleMode::Continuous => {
                // Completing and Complete keep their Stop/Abort rows, nothing leads into them.
                graph.insert(StateId::Execute, Event::StateComplete, StateId::Execute);
            }
        }

        graph
    }

    pub fn single_cycle() -> Self {
        Self::new(CycleMode::SingleCycle)
    }

    pub fn continuous() -> Self {
        Self::new(CycleMode::Continuous)
    }

    pub fn mode(&self) -> CycleMode {
        self.mode
    }

    /// Look up the state `event` leads to from `from`.
    ///
    /// `None` means the event is ignored in that state.
    pub fn next(&self, from: StateId, event: Event) -> Option<StateId> {
        self.rows.get(&(from, event)).copied()
    }

    /// Whether `event` has a row for `from`.
    pub fn accepts(&self, from: StateId, event: Event) -> bool {
        self.rows.contains_key(&(from, event))
    }

    /// Add an `Error` row leading from `from` to `to`.
    ///
    /// Returns the target of an `Error` row already present for `from`, in
    /// which case the graph is left unchanged.
    pub(crate) fn add_error_row(&mut self, from: StateId, to: StateId) -> Result<(), StateId> {
        match self.next(from, Event::Error) {
            Some(existing) if existing != to => Err(existing),
            _ => {
                self.insert(from, Event::Error, to);
                Ok(())
            }
        }
    }

    /// Iterate over every row as `(from, event, to)`.
    pub fn rows(&self) -> impl Iterator<Item = (StateId, Event, StateId)> + '_ {
        self.rows.iter().map(|(&(from, event), &to)| (from, event, to))
    }

    fn insert(&mut self, from: StateId, event: Event, to: StateId) {
        self.rows.insert((from, event), to);
    }
}
