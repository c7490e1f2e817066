//! The engine handle hosts call into.

use super::descriptor::{ExitSignal, StateAction, StateDescriptor};
use super::error::EngineError;
use super::processor::{is_engine_thread, lock, Envelope, Processor, Shared};
use crate::builder::EngineBuilder;
use crate::checkpoint::StatsCheckpoint;
use crate::core::{Event, StateHistory, StateId};
use crate::graph::{CycleMode, TransitionGraph};
use crate::logging::{EngineLog, LogLevel, TracingLog};
use crate::notify::StateChangeNotifier;
use crate::stats::{
    ItemId, StatsAggregator, StatsError, StatsSnapshot, DEFAULT_THROUGHPUT_UNIT,
};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

struct Control {
    tx: Sender<Envelope>,
    processor: JoinHandle<()>,
}

#[derive(Default)]
struct Lifecycle {
    running: Option<Control>,
    /// Processor told to shut down from one of its own threads, not yet joined.
    retired: Option<JoinHandle<()>>,
}

/// A PackML state machine bound to one [`CycleMode`].
///
/// Commands are queued to a single transition-processing thread and answer
/// whether they were legal in the state they observed. Transitional states
/// advance on their own once their action completes, so the states a command
/// leads through are observed with a [`StateChangeNotifier`].
///
/// # Example
///
/// ```rust
/// use packml::core::StateId;
/// use packml::engine::Engine;
///
/// let engine = Engine::single_cycle();
/// assert!(!engine.is_active());
///
/// assert!(engine.activate().unwrap());
/// assert_eq!(engine.current_state(), Some(StateId::Aborted));
///
/// // No row for Start in Aborted.
/// assert!(!engine.start().unwrap());
///
/// engine.deactivate();
/// assert_eq!(engine.current_state(), None);
/// ```
pub struct Engine {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
    /// Held by host threads for the whole of `activate` and `deactivate`.
    switching: Mutex<()>,
}

impl Engine {
    /// Create an engine with default logging and no notifier.
    pub fn new(mode: CycleMode) -> Self {
        Self::from_parts(
            TransitionGraph::new(mode),
            None,
            Arc::new(TracingLog),
            StateHistory::default(),
            StatsAggregator::new(DEFAULT_THROUGHPUT_UNIT),
            Vec::new(),
        )
    }

    pub fn single_cycle() -> Self {
        Self::new(CycleMode::SingleCycle)
    }

    pub fn continuous() -> Self {
        Self::new(CycleMode::Continuous)
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub(crate) fn from_parts(
        graph: TransitionGraph,
        notifier: Option<Arc<dyn StateChangeNotifier>>,
        log: Arc<dyn EngineLog>,
        history: StateHistory,
        stats: StatsAggregator,
        actions: Vec<(StateId, StateAction)>,
    ) -> Self {
        let states: Vec<StateDescriptor> = StateId::ALL
            .iter()
            .copied()
            .map(StateDescriptor::new)
            .collect();
        for (id, action) in actions {
            states[id.index()].set_action(Some(action));
        }

        Self {
            shared: Arc::new(Shared {
                graph,
                states,
                current: Mutex::new(None),
                stats: Mutex::new(stats),
                history: Mutex::new(history),
                notifier,
                log,
            }),
            lifecycle: Mutex::new(Lifecycle::default()),
            switching: Mutex::new(()),
        }
    }

    /// Start the transition-processing thread and enter `Aborted`.
    ///
    /// Returns `Ok(false)` if the engine is already active. A processor still
    /// shutting down is joined first, so at most one ever runs. From the
    /// engine's own threads this always returns `Ok(false)`.
    pub fn activate(&self) -> Result<bool, EngineError> {
        if is_engine_thread(self.shared.key()) {
            return Ok(false);
        }
        let _switching = lock(&self.switching);

        let tx = loop {
            let retired = {
                let mut lifecycle = lock(&self.lifecycle);
                if lifecycle.running.is_some() {
                    return Ok(false);
                }
                match lifecycle.retired.take() {
                    Some(handle) => handle,
                    None => break self.spawn_processor(&mut lifecycle)?,
                }
            };
            self.shared.log(
                LogLevel::Debug,
                "Waiting for the previous processor to stop",
            );
            let _ = retired.join();
        };

        self.shared.log(
            LogLevel::Info,
            &format!("Activating {} engine", self.shared.graph.mode()),
        );
        self.send(&tx, Event::Activate)
    }

    fn spawn_processor(
        &self,
        lifecycle: &mut Lifecycle,
    ) -> Result<Sender<Envelope>, EngineError> {
        let (tx, rx) = mpsc::channel();
        let processor = Processor::new(Arc::clone(&self.shared), tx.clone(), rx);
        let handle = thread::Builder::new()
            .name("packml-transitions".to_string())
            .spawn(move || processor.run())
            .map_err(EngineError::ProcessorSpawn)?;
        lifecycle.running = Some(Control {
            tx: tx.clone(),
            processor: handle,
        });
        Ok(tx)
    }

    /// Leave the current state and stop processing.
    ///
    /// Waits for the current state's action to finish. Called from one of
    /// the engine's own threads it only requests the shutdown; the next
    /// `activate` waits for it. Returns `false` if the engine was not active.
    pub fn deactivate(&self) -> bool {
        if is_engine_thread(self.shared.key()) {
            let mut lifecycle = lock(&self.lifecycle);
            let Some(control) = lifecycle.running.take() else {
                return false;
            };
            self.shared.log(LogLevel::Info, "Deactivating engine");
            let (done_tx, _) = mpsc::channel();
            let _ = control.tx.send(Envelope::Shutdown { reply: done_tx });
            lifecycle.retired = Some(control.processor);
            return true;
        }

        let _switching = lock(&self.switching);
        let Some(control) = lock(&self.lifecycle).running.take() else {
            return false;
        };

        self.shared.log(LogLevel::Info, "Deactivating engine");
        let (done_tx, done_rx) = mpsc::channel();
        if control.tx.send(Envelope::Shutdown { reply: done_tx }).is_ok() {
            let _ = done_rx.recv();
        }
        let _ = control.processor.join();
        true
    }

    pub fn is_active(&self) -> bool {
        lock(&self.lifecycle).running.is_some()
    }

    /// Queue `event` and wait until it has been applied.
    ///
    /// Returns whether it caused a transition. From the engine's own threads
    /// the event is queued without waiting and legality is judged against
    /// the state current at call time.
    pub fn process_event(&self, event: Event) -> Result<bool, EngineError> {
        match self.sender() {
            Some(tx) => self.send(&tx, event),
            None => Ok(false),
        }
    }

    /// Queue `event` without waiting.
    ///
    /// Returns whether the event is legal in the state current at call time.
    pub fn trigger_event(&self, event: Event) -> bool {
        let Some(tx) = self.sender() else {
            return false;
        };
        let legal = self.accepts_now(event);
        tx.send(Envelope::Submit { event, reply: None }).is_ok() && legal
    }

    pub fn clear(&self) -> Result<bool, EngineError> {
        self.process_event(Event::Clear)
    }

    pub fn reset(&self) -> Result<bool, EngineError> {
        self.process_event(Event::Reset)
    }

    pub fn start(&self) -> Result<bool, EngineError> {
        self.process_event(Event::Start)
    }

    pub fn stop(&self) -> Result<bool, EngineError> {
        self.process_event(Event::Stop)
    }

    pub fn abort(&self) -> Result<bool, EngineError> {
        self.process_event(Event::Abort)
    }

    pub fn hold(&self) -> Result<bool, EngineError> {
        self.process_event(Event::Hold)
    }

    pub fn unhold(&self) -> Result<bool, EngineError> {
        self.process_event(Event::Unhold)
    }

    pub fn suspend(&self) -> Result<bool, EngineError> {
        self.process_event(Event::Suspend)
    }

    pub fn unsuspend(&self) -> Result<bool, EngineError> {
        self.process_event(Event::Unsuspend)
    }

    fn sender(&self) -> Option<Sender<Envelope>> {
        lock(&self.lifecycle)
            .running
            .as_ref()
            .map(|control| control.tx.clone())
    }

    fn accepts_now(&self, event: Event) -> bool {
        self.shared
            .current()
            .is_some_and(|state| self.shared.graph.accepts(state, event))
    }

    fn send(&self, tx: &Sender<Envelope>, event: Event) -> Result<bool, EngineError> {
        if is_engine_thread(self.shared.key()) {
            let legal = self.accepts_now(event);
            tx.send(Envelope::Submit { event, reply: None })
                .map_err(|_| EngineError::Disconnected)?;
            return Ok(legal);
        }

        let (reply_tx, reply_rx) = mpsc::channel();
        tx.send(Envelope::Submit {
            event,
            reply: Some(reply_tx),
        })
        .map_err(|_| EngineError::Disconnected)?;
        reply_rx.recv().map_err(|_| EngineError::Disconnected)?
    }

    /// Register the `Execute` action. Returns `0` for success.
    pub fn set_execute<F>(&self, action: F)
    where
        F: Fn() -> i32 + Send + Sync + 'static,
    {
        self.set_state_action(StateId::Execute, action);
    }

    /// Register the action run whenever `state` is entered.
    ///
    /// Takes effect on the next entry of `state`.
    pub fn set_state_action<F>(&self, state: StateId, action: F)
    where
        F: Fn() -> i32 + Send + Sync + 'static,
    {
        self.shared.descriptor(state).set_action(Some(Arc::new(action)));
    }

    pub fn clear_state_action(&self, state: StateId) {
        self.shared.descriptor(state).set_action(None);
    }

    pub fn has_state_action(&self, state: StateId) -> bool {
        self.shared.descriptor(state).has_action()
    }

    /// Exit flag of `state`, for actions that exit cooperatively.
    pub fn exit_signal(&self, state: StateId) -> ExitSignal {
        self.shared.descriptor(state).exit_signal()
    }

    /// `None` while inactive.
    pub fn current_state(&self) -> Option<StateId> {
        self.shared.current()
    }

    pub fn cycle_mode(&self) -> CycleMode {
        self.shared.graph.mode()
    }

    pub fn graph(&self) -> &TransitionGraph {
        &self.shared.graph
    }

    /// Total time spent in `state`, including the current visit.
    pub fn state_time(&self, state: StateId) -> Duration {
        self.shared.descriptor(state).cumulative_time()
    }

    pub fn reset_state_time(&self, state: StateId) {
        self.shared.descriptor(state).reset_cumulative_time();
    }

    pub fn is_state_running(&self, state: StateId) -> bool {
        self.shared.descriptor(state).is_running()
    }

    /// Copy of the recorded transitions.
    pub fn history(&self) -> StateHistory {
        lock(&self.shared.history).clone()
    }

    pub fn increment_success_count(&self) {
        lock(&self.shared.stats).increment_success_count();
    }

    pub fn increment_failure_count(&self) {
        lock(&self.shared.stats).increment_failure_count();
    }

    pub fn increment_quality_stat_item(&self, id: ItemId, count: u64, duration: f64) {
        lock(&self.shared.stats).increment_quality_item(id, count, duration);
    }

    pub fn increment_error_stat_item(&self, id: ItemId, count: u64, duration: f64) {
        lock(&self.shared.stats).increment_error_item(id, count, duration);
    }

    /// Cumulative statistics since construction or the last load.
    pub fn current_stat_snapshot(&self) -> StatsSnapshot {
        lock(&self.shared.stats).snapshot()
    }

    /// Statistics since the previous call, starting a new transaction.
    pub fn current_incremental_stat_snapshot(&self) -> StatsSnapshot {
        lock(&self.shared.stats).take_incremental()
    }

    /// Replace the cumulative statistics with `baseline`.
    ///
    /// Pending incremental deltas are untouched.
    pub fn load_stats(&self, baseline: &StatsSnapshot) -> Result<(), StatsError> {
        lock(&self.shared.stats).load(baseline)?;
        self.shared.log(LogLevel::Info, "Loaded stats baseline");
        Ok(())
    }

    pub fn stats_checkpoint(&self) -> StatsCheckpoint {
        StatsCheckpoint::new(self.current_stat_snapshot())
    }

    pub fn restore_stats(&self, checkpoint: &StatsCheckpoint) -> Result<(), StatsError> {
        self.load_stats(&checkpoint.snapshot)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.deactivate();
        if !is_engine_thread(self.shared.key()) {
            let retired = lock(&self.lifecycle).retired.take();
            if let Some(handle) = retired {
                let _ = handle.join();
            }
        }
    }
}
