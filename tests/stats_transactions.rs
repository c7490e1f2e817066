//! Statistics observed through a running engine.

use packml::builder::EngineBuilder;
use packml::checkpoint::StatsCheckpoint;
use packml::core::StateId;
use packml::engine::Engine;
use packml::logging::NullLog;
use packml::notify::StateRecorder;
use packml::stats::{StatsError, StatsItem, StatsSnapshot};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn quiet_engine() -> (Engine, Arc<StateRecorder>) {
    let recorder = Arc::new(StateRecorder::new());
    let engine = EngineBuilder::new()
        .log(NullLog)
        .notifier(Arc::clone(&recorder))
        .build()
        .unwrap();
    (engine, recorder)
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn quality_examples() {
    let (engine, _) = quiet_engine();

    for _ in 0..90 {
        engine.increment_success_count();
    }
    for _ in 0..10 {
        engine.increment_failure_count();
    }
    let snapshot = engine.current_incremental_stat_snapshot();
    assert_eq!(snapshot.cycle_count, 100);
    assert_close(snapshot.quality, 0.9);

    for _ in 0..90 {
        engine.increment_success_count();
    }
    assert_close(engine.current_incremental_stat_snapshot().quality, 1.0);

    let empty = engine.current_incremental_stat_snapshot();
    assert_eq!(empty.cycle_count, 0);
    assert_eq!(empty.quality, 0.0);
    assert_eq!(empty.overall_equipment_effectiveness, 0.0);
}

#[test]
fn itemized_keys_outlive_the_transaction() {
    let (engine, _) = quiet_engine();
    engine.increment_quality_stat_item(1, 5, 15.0);
    engine.increment_error_stat_item(-4, 2, 0.5);

    let first = engine.current_incremental_stat_snapshot();
    assert_eq!(
        first.itemized_quality_map[&1],
        StatsItem {
            id: 1,
            count: 5,
            duration: 15.0
        }
    );
    assert_eq!(first.itemized_error_map[&-4].count, 2);

    let second = engine.current_incremental_stat_snapshot();
    assert_eq!(second.itemized_quality_map[&1], StatsItem::new(1));
    assert_eq!(second.itemized_error_map[&-4], StatsItem::new(-4));

    let cumulative = engine.current_stat_snapshot();
    assert_eq!(cumulative.itemized_quality_map[&1].count, 5);
}

#[test]
fn occupied_states_are_credited_to_their_categories() {
    let (engine, recorder) = quiet_engine();
    engine.current_incremental_stat_snapshot();

    engine.activate().unwrap();
    thread::sleep(Duration::from_millis(30));
    engine.clear().unwrap();
    assert!(recorder.wait_for(StateId::Stopped, WAIT));
    thread::sleep(Duration::from_millis(30));

    let snapshot = engine.current_incremental_stat_snapshot();
    assert!(snapshot.abort_duration >= 0.03);
    assert!(snapshot.stop_duration >= 0.03);
    assert_eq!(snapshot.exe_duration, 0.0);
    assert!(snapshot.categorized_duration() <= snapshot.duration + 1e-6);
    assert!(snapshot.availability < 0.5);

    let cumulative = engine.current_stat_snapshot();
    assert!(cumulative.abort_duration >= snapshot.abort_duration);
}

#[test]
fn live_duration_grows_between_reads() {
    let (engine, _) = quiet_engine();
    engine.activate().unwrap();

    let first = engine.current_stat_snapshot();
    thread::sleep(Duration::from_millis(10));
    let second = engine.current_stat_snapshot();

    assert!(second.abort_duration > first.abort_duration);
    assert!(second.duration > first.duration);
}

#[test]
fn load_stats_replaces_cumulative_only() {
    let (engine, _) = quiet_engine();
    engine.increment_success_count();

    let mut baseline = StatsSnapshot {
        exe_duration: 400.0,
        idle_duration: 100.0,
        duration: 600.0,
        success_count: 40,
        fail_count: 2,
        ..StatsSnapshot::default()
    };
    baseline.itemized_error_map.insert(
        7,
        StatsItem {
            id: 7,
            count: 3,
            duration: 9.0,
        },
    );
    engine.load_stats(&baseline).unwrap();

    let cumulative = engine.current_stat_snapshot();
    assert_eq!(cumulative.success_count, 40);
    assert_eq!(cumulative.exe_duration, 400.0);
    assert_eq!(cumulative.itemized_error_map[&7].count, 3);
    assert_close(cumulative.performance, 400.0 / 600.0);
    assert_close(cumulative.throughput, 40.0 / 600.0 * 60.0);

    let pending = engine.current_incremental_stat_snapshot();
    assert_eq!(pending.success_count, 1);
    assert!(pending.itemized_error_map.is_empty());
}

#[test]
fn invalid_baseline_is_rejected() {
    let (engine, _) = quiet_engine();
    engine.increment_success_count();

    let mut baseline = StatsSnapshot {
        exe_duration: -1.0,
        duration: f64::NAN,
        ..StatsSnapshot::default()
    };
    baseline.itemized_quality_map.insert(2, StatsItem::new(3));

    match engine.load_stats(&baseline) {
        Err(StatsError::InvalidBaseline(violations)) => assert_eq!(violations.len(), 3),
        other => panic!("expected an invalid baseline, got {other:?}"),
    }
    assert_eq!(engine.current_stat_snapshot().success_count, 1);
}

#[test]
fn checkpoint_restores_counters_into_a_new_engine() {
    let (engine, _) = quiet_engine();
    for _ in 0..3 {
        engine.increment_success_count();
    }
    engine.increment_quality_stat_item(1, 5, 15.0);
    let json = engine.stats_checkpoint().to_json().unwrap();

    let (restarted, _) = quiet_engine();
    let checkpoint = StatsCheckpoint::from_json(&json).unwrap();
    restarted.restore_stats(&checkpoint).unwrap();

    let snapshot = restarted.current_stat_snapshot();
    assert_eq!(snapshot.success_count, 3);
    assert_eq!(snapshot.itemized_quality_map[&1].duration, 15.0);
}
