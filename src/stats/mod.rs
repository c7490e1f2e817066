//! Production statistics with derived OEE metrics.
//!
//! [`StatsAggregator`] is fed state entries and exits by the engine and
//! outcome counts by the host. It offers a non-destructive cumulative view
//! and a transactional incremental view; OEE fields are computed when a
//! snapshot is read:
//!
//! - availability = (duration − abort − stop) / duration, 1 when duration ≤ 0
//! - performance = execute / (duration − abort − stop), 0 when that is ≤ 0
//! - quality = success / (success + fail), 0 without outcomes
//! - overall equipment effectiveness = availability × performance × quality

mod aggregator;
pub mod error;
mod snapshot;
mod validate;

pub use aggregator::{StatsAggregator, DEFAULT_THROUGHPUT_UNIT};
pub use error::{BaselineViolation, StatsError};
pub use snapshot::{ItemId, StatsItem, StatsSnapshot};
pub use validate::validate_baseline;
pub(crate) use validate::check_baseline;
