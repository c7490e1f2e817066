//! Baseline validation using Validation.
//!
//! A baseline is checked field by field and every violation is reported at
//! once, so a host restoring persisted counters sees all problems together.

use super::error::{BaselineViolation, StatsError};
use super::snapshot::{ItemId, StatsItem, StatsSnapshot};
use std::collections::BTreeMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<BaselineViolation>>;

/// Validate `snapshot` as a baseline, accumulating ALL violations.
pub fn validate_baseline(snapshot: &StatsSnapshot) -> Check {
    let mut checks: Vec<Check> = Vec::new();

    for (field, value) in snapshot.duration_fields() {
        checks.push(if is_valid_seconds(value) {
            Validation::success(())
        } else {
            Validation::fail(BaselineViolation::InvalidDuration { field, value })
        });
    }

    check_items("itemized_error_map", &snapshot.itemized_error_map, &mut checks);
    check_items(
        "itemized_quality_map",
        &snapshot.itemized_quality_map,
        &mut checks,
    );

    Validation::all_vec(checks).map(|_| ())
}

/// Run [`validate_baseline`] and convert the outcome into a `Result`.
pub(crate) fn check_baseline(snapshot: &StatsSnapshot) -> Result<(), StatsError> {
    match validate_baseline(snapshot) {
        Validation::Success(_) => Ok(()),
        Validation::Failure(errors) => Err(StatsError::InvalidBaseline(
            errors.iter().cloned().collect(),
        )),
    }
}

fn check_items(map: &'static str, items: &BTreeMap<ItemId, StatsItem>, checks: &mut Vec<Check>) {
    for (&key, item) in items {
        checks.push(if key == item.id {
            Validation::success(())
        } else {
            Validation::fail(BaselineViolation::KeyMismatch {
                map,
                key,
                id: item.id,
            })
        });
        checks.push(if is_valid_seconds(item.duration) {
            Validation::success(())
        } else {
            Validation::fail(BaselineViolation::InvalidItemDuration {
                map,
                id: item.id,
                value: item.duration,
            })
        });
    }
}

fn is_valid_seconds(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
