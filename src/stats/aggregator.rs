//! Cumulative and transactional stats accumulation.

use super::error::StatsError;
use super::snapshot::{ItemId, StatsSnapshot};
use super::validate::check_baseline;
use crate::core::StateId;
use std::time::{Duration, Instant};

/// Default unit throughput is extrapolated to: items per minute.
pub const DEFAULT_THROUGHPUT_UNIT: Duration = Duration::from_secs(60);

/// The state currently accruing time, with the instant each view last
/// accounted for it.
#[derive(Clone, Copy, Debug)]
struct Occupancy {
    state: StateId,
    cumulative_mark: Instant,
    pending_mark: Instant,
}

/// Accumulates state durations, outcome counts and itemized stats.
///
/// Two views are kept side by side:
/// - the cumulative view, since construction or the last [`load`](Self::load),
///   read without side effects by [`snapshot`](Self::snapshot)
/// - the pending transaction, returned and reset by
///   [`take_incremental`](Self::take_incremental)
///
/// The cumulative total `duration` is the time spent in states; the
/// incremental total is the wall time since the previous transactional read.
///
/// Methods taking an explicit `Instant` exist so the aggregator can be driven
/// deterministically; the engine uses the `now` variants.
///
/// # Example
///
/// ```rust
/// use packml::stats::StatsAggregator;
///
/// let mut stats = StatsAggregator::default();
/// for _ in 0..9 {
///     stats.increment_success_count();
/// }
/// stats.increment_failure_count();
///
/// let snapshot = stats.take_incremental();
/// assert_eq!(snapshot.cycle_count, 10);
/// assert!((snapshot.quality - 0.9).abs() < 1e-9);
///
/// let next = stats.take_incremental();
/// assert_eq!(next.success_count, 0);
/// ```
#[derive(Clone, Debug)]
pub struct StatsAggregator {
    throughput_unit: Duration,
    cumulative: StatsSnapshot,
    pending: StatsSnapshot,
    transaction_start: Instant,
    occupancy: Option<Occupancy>,
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_THROUGHPUT_UNIT)
    }
}

impl StatsAggregator {
    pub fn new(throughput_unit: Duration) -> Self {
        Self::starting_at(throughput_unit, Instant::now())
    }

    /// Create an aggregator whose first transaction opens at `at`.
    pub fn starting_at(throughput_unit: Duration, at: Instant) -> Self {
        Self {
            throughput_unit,
            cumulative: StatsSnapshot::default(),
            pending: StatsSnapshot::default(),
            transaction_start: at,
            occupancy: None,
        }
    }

    pub fn throughput_unit(&self) -> Duration {
        self.throughput_unit
    }

    /// The state currently accruing time, if any.
    pub fn occupied_state(&self) -> Option<StateId> {
        self.occupancy.map(|o| o.state)
    }

    /// Start accruing time for `state`.
    ///
    /// A state still marked as occupied is closed at `at` first.
    pub fn state_entered(&mut self, state: StateId, at: Instant) {
        if let Some(previous) = self.occupancy {
            self.state_exited(previous.state, at);
        }
        self.occupancy = Some(Occupancy {
            state,
            cumulative_mark: at,
            pending_mark: at,
        });
    }

    /// Stop accruing time for `state`, crediting it to both views.
    ///
    /// Ignored unless `state` is the occupied state.
    pub fn state_exited(&mut self, state: StateId, at: Instant) {
        match self.occupancy {
            Some(occupancy) if occupancy.state == state => {
                self.cumulative
                    .credit(state, seconds_between(occupancy.cumulative_mark, at));
                self.pending
                    .credit(state, seconds_between(occupancy.pending_mark, at));
                self.occupancy = None;
            }
            _ => {}
        }
    }

    pub fn increment_success_count(&mut self) {
        self.cumulative.success_count = self.cumulative.success_count.saturating_add(1);
        self.pending.success_count = self.pending.success_count.saturating_add(1);
    }

    pub fn increment_failure_count(&mut self) {
        self.cumulative.fail_count = self.cumulative.fail_count.saturating_add(1);
        self.pending.fail_count = self.pending.fail_count.saturating_add(1);
    }

    /// Add `count` and `duration` seconds to quality bucket `id`, creating it
    /// on first use.
    pub fn increment_quality_item(&mut self, id: ItemId, count: u64, duration: f64) {
        StatsSnapshot::add_item(&mut self.cumulative.itemized_quality_map, id, count, duration);
        StatsSnapshot::add_item(&mut self.pending.itemized_quality_map, id, count, duration);
    }

    /// Add `count` and `duration` seconds to error bucket `id`, creating it
    /// on first use.
    pub fn increment_error_item(&mut self, id: ItemId, count: u64, duration: f64) {
        StatsSnapshot::add_item(&mut self.cumulative.itemized_error_map, id, count, duration);
        StatsSnapshot::add_item(&mut self.pending.itemized_error_map, id, count, duration);
    }

    /// Cumulative view, including the live time of the occupied state.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.snapshot_at(Instant::now())
    }

    pub fn snapshot_at(&self, at: Instant) -> StatsSnapshot {
        let mut snapshot = self.cumulative.clone();
        if let Some(occupancy) = self.occupancy {
            snapshot.credit(occupancy.state, seconds_between(occupancy.cumulative_mark, at));
        }
        snapshot.derive(self.throughput_unit);
        snapshot
    }

    /// Return the pending transaction and open a new one.
    pub fn take_incremental(&mut self) -> StatsSnapshot {
        self.take_incremental_at(Instant::now())
    }

    pub fn take_incremental_at(&mut self, at: Instant) -> StatsSnapshot {
        let mut snapshot = self.pending.clone();
        if let Some(occupancy) = self.occupancy.as_mut() {
            snapshot.credit(occupancy.state, seconds_between(occupancy.pending_mark, at));
            occupancy.pending_mark = at;
        }
        snapshot.duration = seconds_between(self.transaction_start, at);
        snapshot.derive(self.throughput_unit);

        self.pending.clear();
        self.transaction_start = at;
        snapshot
    }

    /// Replace the cumulative baseline with `baseline`.
    ///
    /// Derived fields of `baseline` are ignored. The pending transaction is
    /// left untouched. On error nothing changes.
    pub fn load(&mut self, baseline: &StatsSnapshot) -> Result<(), StatsError> {
        self.load_at(baseline, Instant::now())
    }

    pub fn load_at(&mut self, baseline: &StatsSnapshot, at: Instant) -> Result<(), StatsError> {
        check_baseline(baseline)?;
        self.cumulative = baseline.clone().into_baseline();
        if let Some(occupancy) = self.occupancy.as_mut() {
            occupancy.cumulative_mark = at;
        }
        Ok(())
    }
}

fn seconds_between(from: Instant, to: Instant) -> f64 {
    to.saturating_duration_since(from).as_secs_f64()
}
