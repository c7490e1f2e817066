//! The transition-processing thread.
//!
//! Exactly one [`Processor`] runs per active engine. It owns the receiving
//! end of the event queue and applies envelopes strictly in arrival order,
//! so at most one transition is ever in flight.

use super::descriptor::StateDescriptor;
use super::error::EngineError;
use crate::core::{Event, StateHistory, StateId, StateTransition};
use crate::graph::TransitionGraph;
use crate::logging::{EngineLog, LogLevel};
use crate::notify::StateChangeNotifier;
use crate::stats::StatsAggregator;
use chrono::Utc;
use std::cell::Cell;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

thread_local! {
    static ENGINE_THREAD: Cell<usize> = const { Cell::new(0) };
}

/// Tag the current thread as belonging to the engine identified by `key`.
pub(crate) fn mark_engine_thread(key: usize) {
    ENGINE_THREAD.with(|current| current.set(key));
}

/// Whether the current thread is the processor or an action of engine `key`.
pub(crate) fn is_engine_thread(key: usize) -> bool {
    key != 0 && ENGINE_THREAD.with(|current| current.get() == key)
}

/// A reply slot for a submitted event.
pub(crate) type Reply = Sender<Result<bool, EngineError>>;

/// Unit of work on the event queue.
pub(crate) enum Envelope {
    /// Host command or injected event.
    Submit { event: Event, reply: Option<Reply> },
    /// Outcome reported by the action of state instance `generation`.
    Outcome { event: Event, generation: u64 },
    /// Leave the current state and stop processing.
    Shutdown { reply: Sender<()> },
}

/// State shared between the engine handle, the processor and action threads.
pub(crate) struct Shared {
    pub(crate) graph: TransitionGraph,
    pub(crate) states: Vec<StateDescriptor>,
    pub(crate) current: Mutex<Option<StateId>>,
    pub(crate) stats: Mutex<StatsAggregator>,
    pub(crate) history: Mutex<StateHistory>,
    pub(crate) notifier: Option<Arc<dyn StateChangeNotifier>>,
    pub(crate) log: Arc<dyn EngineLog>,
}

impl Shared {
    pub(crate) fn descriptor(&self, id: StateId) -> &StateDescriptor {
        &self.states[id.index()]
    }

    pub(crate) fn current(&self) -> Option<StateId> {
        *lock(&self.current)
    }

    /// Identity used to recognise this engine's own threads.
    pub(crate) fn key(self: &Arc<Self>) -> usize {
        Arc::as_ptr(self) as usize
    }

    pub(crate) fn log(&self, level: LogLevel, message: &str) {
        self.log.log(level, message);
    }
}

pub(crate) struct Processor {
    shared: Arc<Shared>,
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
    generation: u64,
}

impl Processor {
    pub(crate) fn new(
        shared: Arc<Shared>,
        tx: Sender<Envelope>,
        rx: Receiver<Envelope>,
    ) -> Self {
        Self {
            shared,
            tx,
            rx,
            generation: 0,
        }
    }

    /// Drain the queue until shutdown.
    pub(crate) fn run(mut self) {
        mark_engine_thread(self.shared.key());

        while let Ok(envelope) = self.rx.recv() {
            match envelope {
                Envelope::Submit { event, reply } => {
                    let outcome = self.apply(event);
                    match reply {
                        Some(reply) => {
                            let _ = reply.send(outcome);
                        }
                        None => {
                            if let Err(err) = outcome {
                                self.shared.log(LogLevel::Error, &err.to_string());
                            }
                        }
                    }
                }
                Envelope::Outcome { event, generation } => {
                    if generation != self.generation {
                        self.shared.log(
                            LogLevel::Debug,
                            &format!("Dropping stale {event} from an exited state"),
                        );
                        continue;
                    }
                    if let Err(err) = self.apply(event) {
                        self.shared.log(LogLevel::Error, &err.to_string());
                    }
                }
                Envelope::Shutdown { reply } => {
                    if let Some(state) = self.shared.current() {
                        self.exit(state);
                    }
                    *lock(&self.shared.current) = None;
                    let _ = reply.send(());
                    break;
                }
            }
        }
    }

    /// Apply one event, returning whether it caused a transition.
    fn apply(&mut self, event: Event) -> Result<bool, EngineError> {
        let current = self.shared.current();
        let next = match (current, event) {
            (None, Event::Activate) => StateId::Aborted,
            (_, Event::Activate | Event::Deactivate) | (None, _) => return Ok(false),
            (Some(from), _) => match self.shared.graph.next(from, event) {
                Some(to) => to,
                None => {
                    let level = if event == Event::Error {
                        LogLevel::Info
                    } else {
                        LogLevel::Debug
                    };
                    let message = if event.is_command() {
                        format!("Ignoring {event} in {from}")
                    } else {
                        format!("No {event} row for {from}")
                    };
                    self.shared.log(level, &message);
                    return Ok(false);
                }
            },
        };

        if let Some(from) = current {
            self.exit(from);
        }
        self.enter(current, next, event)?;
        Ok(true)
    }

    fn enter(
        &mut self,
        from: Option<StateId>,
        to: StateId,
        event: Event,
    ) -> Result<(), EngineError> {
        let shared = Arc::clone(&self.shared);
        let descriptor = shared.descriptor(to);
        let now = Instant::now();

        descriptor.enter(now);
        self.generation += 1;
        *lock(&shared.current) = Some(to);
        lock(&shared.stats).state_entered(to, now);
        lock(&shared.history).record(StateTransition {
            from,
            to,
            event,
            timestamp: Utc::now(),
        });

        if let Some(notifier) = &shared.notifier {
            notifier.state_changed(to.name(), to);
        }
        shared.log(
            LogLevel::Info,
            &format!("Entering: {to} (state {})", to.code()),
        );

        let tx = self.tx.clone();
        let generation = self.generation;
        descriptor
            .dispatch(shared.key(), Arc::clone(&shared.log), move |outcome| {
                let _ = tx.send(Envelope::Outcome {
                    event: outcome,
                    generation,
                });
            })
            .map_err(|source| {
                shared.log(
                    LogLevel::Error,
                    &format!("Unable to schedule state method for {to}: {source}"),
                );
                EngineError::ActionSpawn { state: to, source }
            })
    }

    fn exit(&mut self, state: StateId) {
        let left_at = self.shared.descriptor(state).exit();
        lock(&self.shared.stats).state_exited(state, left_at);
        self.shared.log(LogLevel::Info, &format!("Leaving: {state}"));
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
