//! Builder for configuring an engine before it is first activated.

use super::config::EngineConfig;
use super::error::BuildError;
use crate::core::{StateHistory, StateId};
use crate::engine::{Engine, StateAction};
use crate::graph::{CycleMode, TransitionGraph};
use crate::logging::{EngineLog, TracingLog};
use crate::notify::StateChangeNotifier;
use crate::stats::StatsAggregator;
use std::sync::Arc;

/// Builder for constructing engines with a fluent API.
///
/// # Example
///
/// ```rust
/// use packml::builder::EngineBuilder;
/// use packml::core::StateId;
/// use packml::graph::CycleMode;
///
/// let engine = EngineBuilder::new()
///     .mode(CycleMode::Continuous)
///     .execute(|| 0)
///     .error_transition(StateId::Execute, StateId::Stopping)
///     .build()
///     .unwrap();
///
/// assert_eq!(engine.cycle_mode(), CycleMode::Continuous);
/// assert!(engine.has_state_action(StateId::Execute));
/// ```
pub struct EngineBuilder {
    config: EngineConfig,
    notifier: Option<Arc<dyn StateChangeNotifier>>,
    log: Arc<dyn EngineLog>,
    actions: Vec<(StateId, StateAction)>,
    error_rows: Vec<(StateId, StateId)>,
}

impl EngineBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self::from_config(EngineConfig::default())
    }

    /// Start from a loaded configuration.
    pub fn from_config(config: EngineConfig) -> Self {
        Self {
            config,
            notifier: None,
            log: Arc::new(TracingLog),
            actions: Vec::new(),
            error_rows: Vec::new(),
        }
    }

    pub fn mode(mut self, mode: CycleMode) -> Self {
        self.config.cycle_mode = mode;
        self
    }

    /// Receive every state entry.
    pub fn notifier<N>(mut self, notifier: Arc<N>) -> Self
    where
        N: StateChangeNotifier + 'static,
    {
        self.notifier = Some(notifier);
        self
    }

    /// Replace the default `tracing` logger.
    pub fn log<L>(mut self, log: L) -> Self
    where
        L: EngineLog + 'static,
    {
        self.log = Arc::new(log);
        self
    }

    /// Register the `Execute` action.
    pub fn execute<F>(self, action: F) -> Self
    where
        F: Fn() -> i32 + Send + Sync + 'static,
    {
        self.state_action(StateId::Execute, action)
    }

    /// Register the action run whenever `state` is entered.
    pub fn state_action<F>(mut self, state: StateId, action: F) -> Self
    where
        F: Fn() -> i32 + Send + Sync + 'static,
    {
        self.actions.retain(|(id, _)| *id != state);
        self.actions.push((state, Arc::new(action)));
        self
    }

    /// Route a failed action in `from` to `to`.
    pub fn error_transition(mut self, from: StateId, to: StateId) -> Self {
        self.error_rows.push((from, to));
        self
    }

    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.config.history_capacity = capacity;
        self
    }

    /// Time unit throughput is extrapolated to, in seconds.
    pub fn throughput_unit_secs(mut self, secs: u64) -> Self {
        self.config.throughput_unit_secs = secs;
        self
    }

    /// Build the engine.
    /// Returns an error if the configuration is inconsistent.
    pub fn build(self) -> Result<Engine, BuildError> {
        if self.config.throughput_unit_secs == 0 {
            return Err(BuildError::ZeroThroughputUnit);
        }

        let mut graph = TransitionGraph::new(self.config.cycle_mode);
        for (from, to) in self.error_rows {
            graph
                .add_error_row(from, to)
                .map_err(|existing| BuildError::ConflictingErrorTransition {
                    from,
                    existing,
                    requested: to,
                })?;
        }

        Ok(Engine::from_parts(
            graph,
            self.notifier,
            self.log,
            StateHistory::with_capacity(self.config.history_capacity),
            StatsAggregator::new(self.config.throughput_unit()),
            self.actions,
        ))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Event;
    use crate::logging::NullLog;

    #[test]
    fn builder_validates_throughput_unit() {
        let result = EngineBuilder::new().throughput_unit_secs(0).build();

        assert!(matches!(result, Err(BuildError::ZeroThroughputUnit)));
    }

    #[test]
    fn throughput_unit_scales_throughput() {
        let engine = EngineBuilder::new()
            .log(NullLog)
            .throughput_unit_secs(3600)
            .build()
            .unwrap();
        let baseline = crate::stats::StatsSnapshot {
            duration: 7200.0,
            success_count: 10,
            ..Default::default()
        };
        engine.load_stats(&baseline).unwrap();

        let throughput = engine.current_stat_snapshot().throughput;
        assert!((throughput - 5.0).abs() < 1e-9);
    }

    #[test]
    fn error_rows_are_added_to_the_graph() {
        let engine = EngineBuilder::new()
            .log(NullLog)
            .error_transition(StateId::Execute, StateId::Aborting)
            .error_transition(StateId::Execute, StateId::Aborting)
            .build()
            .unwrap();

        assert_eq!(
            engine.graph().next(StateId::Execute, Event::Error),
            Some(StateId::Aborting)
        );
        assert!(!engine.graph().accepts(StateId::Idle, Event::Error));
    }

    #[test]
    fn conflicting_error_rows_are_rejected() {
        let result = EngineBuilder::new()
            .log(NullLog)
            .error_transition(StateId::Execute, StateId::Aborting)
            .error_transition(StateId::Execute, StateId::Stopping)
            .build();

        assert!(matches!(
            result,
            Err(BuildError::ConflictingErrorTransition {
                from: StateId::Execute,
                existing: StateId::Aborting,
                requested: StateId::Stopping,
            })
        ));
    }

    #[test]
    fn config_selects_the_graph() {
        let config = EngineConfig::from_json(r#"{"cycle_mode": "continuous"}"#).unwrap();
        let engine = EngineBuilder::from_config(config).log(NullLog).build().unwrap();

        assert_eq!(engine.cycle_mode(), CycleMode::Continuous);
        assert_eq!(
            engine.graph().next(StateId::Execute, Event::StateComplete),
            Some(StateId::Execute)
        );
    }

    #[test]
    fn later_action_replaces_earlier_one() {
        let engine = EngineBuilder::new()
            .log(NullLog)
            .execute(|| 1)
            .execute(|| 0)
            .build()
            .unwrap();

        assert!(engine.has_state_action(StateId::Execute));
        assert!(!engine.has_state_action(StateId::Idle));
    }
}
