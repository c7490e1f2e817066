//! Stats error types.

use super::snapshot::ItemId;
use thiserror::Error;

/// A single problem found in a stats baseline
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BaselineViolation {
    #[error("{field} must be a finite, non-negative number of seconds (got {value})")]
    InvalidDuration { field: &'static str, value: f64 },

    #[error("{map} entry keyed {key} carries item id {id}")]
    KeyMismatch {
        map: &'static str,
        key: ItemId,
        id: ItemId,
    },

    #[error("{map} item {id} has an invalid duration ({value})")]
    InvalidItemDuration {
        map: &'static str,
        id: ItemId,
        value: f64,
    },
}

/// Errors that can occur when loading stats
#[derive(Debug, Error)]
pub enum StatsError {
    /// The baseline failed validation; every violation is listed
    #[error("Invalid stats baseline ({} violations)", .0.len())]
    InvalidBaseline(Vec<BaselineViolation>),
}
