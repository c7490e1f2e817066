//! Per-state timing and action dispatch.
//!
//! Every state shares one lifecycle: on entry the descriptor starts its
//! timer and dispatches the state's action on its own thread; on exit it
//! raises the exit flag, joins that thread and accumulates the time spent.

use super::processor::{lock, mark_engine_thread};
use crate::core::{Event, StateId};
use crate::logging::{EngineLog, LogLevel};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Work run when a state is entered.
///
/// Returns `0` on success; any other value is a failure and raises
/// [`Event::Error`].
pub type StateAction = Arc<dyn Fn() -> i32 + Send + Sync>;

/// Read-only view of a state's exit flag.
///
/// Long-running actions should poll it and return once it is set: leaving
/// the state waits for the action to finish.
///
/// # Example
///
/// ```rust
/// use packml::core::StateId;
/// use packml::engine::Engine;
/// use std::time::Duration;
///
/// let engine = Engine::continuous();
/// let exit = engine.exit_signal(StateId::Execute);
/// engine.set_execute(move || {
///     while !exit.is_exiting() {
///         std::thread::sleep(Duration::from_millis(5));
///     }
///     0
/// });
/// ```
#[derive(Clone, Debug)]
pub struct ExitSignal(Arc<AtomicBool>);

impl ExitSignal {
    pub fn is_exiting(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct Timing {
    running: bool,
    start: Instant,
    cumulative: Duration,
}

/// Identity, timing and action of one state.
pub(crate) struct StateDescriptor {
    id: StateId,
    action: Mutex<Option<StateAction>>,
    exiting: Arc<AtomicBool>,
    timing: Mutex<Timing>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl StateDescriptor {
    pub(crate) fn new(id: StateId) -> Self {
        Self {
            id,
            action: Mutex::new(None),
            exiting: Arc::new(AtomicBool::new(false)),
            timing: Mutex::new(Timing {
                running: false,
                start: Instant::now(),
                cumulative: Duration::ZERO,
            }),
            task: Mutex::new(None),
        }
    }

    pub(crate) fn set_action(&self, action: Option<StateAction>) {
        *lock(&self.action) = action;
    }

    pub(crate) fn has_action(&self) -> bool {
        lock(&self.action).is_some()
    }

    pub(crate) fn exit_signal(&self) -> ExitSignal {
        ExitSignal(Arc::clone(&self.exiting))
    }

    pub(crate) fn is_running(&self) -> bool {
        lock(&self.timing).running
    }

    /// Start the state's timer.
    pub(crate) fn enter(&self, at: Instant) {
        let mut timing = lock(&self.timing);
        timing.start = at;
        self.exiting.store(false, Ordering::SeqCst);
        timing.running = true;
    }

    /// Run the state's action on its own thread.
    ///
    /// `report` receives the outcome: `StateComplete` on success unless the
    /// state is exiting by then, `Error` on failure or panic. Without an
    /// action `StateComplete` is reported immediately on the calling thread.
    pub(crate) fn dispatch<F>(
        &self,
        engine_key: usize,
        log: Arc<dyn EngineLog>,
        report: F,
    ) -> io::Result<()>
    where
        F: FnOnce(Event) + Send + 'static,
    {
        let Some(action) = lock(&self.action).clone() else {
            report(Event::StateComplete);
            return Ok(());
        };

        let id = self.id;
        let exiting = Arc::clone(&self.exiting);
        let handle = thread::Builder::new()
            .name(format!("packml-{}", id.name().to_lowercase()))
            .spawn(move || {
                mark_engine_thread(engine_key);
                let status = panic::catch_unwind(AssertUnwindSafe(|| action()))
                    .unwrap_or_else(|_| {
                        log.log(LogLevel::Warn, &format!("State method panicked: {id}"));
                        -1
                    });

                if status == 0 {
                    if !exiting.load(Ordering::SeqCst) {
                        report(Event::StateComplete);
                    }
                } else {
                    log.log(
                        LogLevel::Info,
                        &format!("Error running state method: {id} (status {status})"),
                    );
                    report(Event::Error);
                }
            })?;

        *lock(&self.task) = Some(handle);
        Ok(())
    }

    /// Raise the exit flag, join the in-flight action and stop the timer.
    ///
    /// Returns the instant the state was left.
    pub(crate) fn exit(&self) -> Instant {
        self.exiting.store(true, Ordering::SeqCst);
        let task = lock(&self.task).take();
        if let Some(handle) = task {
            // Panics are caught inside the task.
            let _ = handle.join();
        }

        let now = Instant::now();
        let mut timing = lock(&self.timing);
        if timing.running {
            let elapsed = now.saturating_duration_since(timing.start);
            timing.cumulative += elapsed;
            timing.running = false;
        }
        now
    }

    /// Accumulated time, including the live time of a running state.
    pub(crate) fn cumulative_time(&self) -> Duration {
        let timing = lock(&self.timing);
        if timing.running {
            timing.cumulative + timing.start.elapsed()
        } else {
            timing.cumulative
        }
    }

    /// Zero the accumulated time; a running state restarts its timer.
    pub(crate) fn reset_cumulative_time(&self) {
        let mut timing = lock(&self.timing);
        if timing.running {
            timing.start = Instant::now();
        }
        timing.cumulative = Duration::ZERO;
    }
}
