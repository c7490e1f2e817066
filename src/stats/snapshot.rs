//! Stats snapshot records exchanged with hosts.

use crate::core::{DurationCategory, StateId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Identifier of an itemized stat bucket (an error or quality code).
pub type ItemId = i32;

/// Per-cause counter bucket.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsItem {
    pub id: ItemId,
    pub count: u64,
    /// Seconds attributed to this cause.
    pub duration: f64,
}

impl StatsItem {
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            count: 0,
            duration: 0.0,
        }
    }

    fn clear(&mut self) {
        self.count = 0;
        self.duration = 0.0;
    }
}

/// Stats record returned by both read modes and accepted as a baseline.
///
/// Durations are in seconds. The fields from `cycle_count` through
/// `overall_equipment_effectiveness` are derived when a snapshot is read and
/// are ignored when a snapshot is loaded as a baseline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSnapshot {
    pub idle_duration: f64,
    pub exe_duration: f64,
    pub held_duration: f64,
    pub susp_duration: f64,
    pub cmplt_duration: f64,
    pub stop_duration: f64,
    pub abort_duration: f64,
    pub duration: f64,
    pub success_count: u64,
    pub fail_count: u64,
    pub cycle_count: u64,
    pub throughput: f64,
    pub availability: f64,
    pub performance: f64,
    pub quality: f64,
    pub overall_equipment_effectiveness: f64,
    pub itemized_error_map: BTreeMap<ItemId, StatsItem>,
    pub itemized_quality_map: BTreeMap<ItemId, StatsItem>,
}

impl StatsSnapshot {
    /// Duration of one named category.
    pub fn category_duration(&self, category: DurationCategory) -> f64 {
        match category {
            DurationCategory::Idle => self.idle_duration,
            DurationCategory::Execute => self.exe_duration,
            DurationCategory::Held => self.held_duration,
            DurationCategory::Suspended => self.susp_duration,
            DurationCategory::Complete => self.cmplt_duration,
            DurationCategory::Stopped => self.stop_duration,
            DurationCategory::Aborted => self.abort_duration,
        }
    }

    /// Sum of the seven named category durations.
    pub fn categorized_duration(&self) -> f64 {
        self.duration_fields()
            .iter()
            .filter(|(name, _)| *name != "duration")
            .map(|(_, value)| value)
            .sum()
    }

    /// Every duration field with its name, total last.
    pub(crate) fn duration_fields(&self) -> [(&'static str, f64); 8] {
        [
            ("idle_duration", self.idle_duration),
            ("exe_duration", self.exe_duration),
            ("held_duration", self.held_duration),
            ("susp_duration", self.susp_duration),
            ("cmplt_duration", self.cmplt_duration),
            ("stop_duration", self.stop_duration),
            ("abort_duration", self.abort_duration),
            ("duration", self.duration),
        ]
    }

    /// Credit `seconds` spent in `state` to its category and to the total.
    pub(crate) fn credit(&mut self, state: StateId, seconds: f64) {
        if let Some(category) = state.category() {
            *self.category_duration_mut(category) += seconds;
        }
        self.duration += seconds;
    }

    pub(crate) fn add_item(
        map: &mut BTreeMap<ItemId, StatsItem>,
        id: ItemId,
        count: u64,
        duration: f64,
    ) {
        let item = map.entry(id).or_insert_with(|| StatsItem::new(id));
        item.count = item.count.saturating_add(count);
        item.duration += duration;
    }

    /// Zero every numeric field, keeping itemized keys.
    pub(crate) fn clear(&mut self) {
        let error_map = std::mem::take(&mut self.itemized_error_map);
        let quality_map = std::mem::take(&mut self.itemized_quality_map);
        *self = Self {
            itemized_error_map: error_map,
            itemized_quality_map: quality_map,
            ..Self::default()
        };
        self.itemized_error_map.values_mut().for_each(StatsItem::clear);
        self.itemized_quality_map.values_mut().for_each(StatsItem::clear);
    }

    /// Strip derived fields, leaving only what a baseline carries.
    pub(crate) fn into_baseline(mut self) -> Self {
        self.cycle_count = 0;
        self.throughput = 0.0;
        self.availability = 0.0;
        self.performance = 0.0;
        self.quality = 0.0;
        self.overall_equipment_effectiveness = 0.0;
        self
    }

    /// Fill the derived OEE fields from the raw counters.
    ///
    /// `throughput_unit` is the time unit throughput is extrapolated to.
    pub(crate) fn derive(&mut self, throughput_unit: Duration) {
        self.cycle_count = self.success_count.saturating_add(self.fail_count);

        self.throughput = if self.duration > 0.0 {
            self.success_count as f64 / self.duration * throughput_unit.as_secs_f64()
        } else {
            0.0
        };

        let available = self.duration - self.abort_duration - self.stop_duration;
        self.availability = if self.duration > 0.0 {
            available / self.duration
        } else {
            1.0
        };
        self.performance = if available > 0.0 {
            self.exe_duration / available
        } else {
            0.0
        };
        self.quality = if self.cycle_count > 0 {
            self.success_count as f64 / self.cycle_count as f64
        } else {
            0.0
        };
        self.overall_equipment_effectiveness =
            self.availability * self.performance * self.quality;
    }

    fn category_duration_mut(&mut self, category: DurationCategory) -> &mut f64 {
        match category {
            DurationCategory::Idle => &mut self.idle_duration,
            DurationCategory::Execute => &mut self.exe_duration,
            DurationCategory::Held => &mut self.held_duration,
            DurationCategory::Suspended => &mut self.susp_duration,
            DurationCategory::Complete => &mut self.cmplt_duration,
            DurationCategory::Stopped => &mut self.stop_duration,
            DurationCategory::Aborted => &mut self.abort_duration,
        }
    }
}
