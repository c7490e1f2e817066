//! Property-based tests for the transition graph and the stats aggregator.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use packml::core::{Event, StateId};
use packml::graph::{CycleMode, TransitionGraph};
use packml::stats::{StatsAggregator, StatsItem, StatsSnapshot, DEFAULT_THROUGHPUT_UNIT};
use proptest::prelude::*;
use std::time::{Duration, Instant};

prop_compose! {
    fn arbitrary_state()(index in 0..StateId::ALL.len()) -> StateId {
        StateId::ALL[index]
    }
}

prop_compose! {
    fn arbitrary_event()(variant in 0..13u8) -> Event {
        match variant {
            0 => Event::Activate,
            1 => Event::Deactivate,
            2 => Event::Clear,
            3 => Event::Reset,
            4 => Event::Start,
            5 => Event::Stop,
            6 => Event::Abort,
            7 => Event::Hold,
            8 => Event::Unhold,
            9 => Event::Suspend,
            10 => Event::Unsuspend,
            11 => Event::StateComplete,
            _ => Event::Error,
        }
    }
}

prop_compose! {
    fn arbitrary_mode()(continuous in any::<bool>()) -> CycleMode {
        if continuous { CycleMode::Continuous } else { CycleMode::SingleCycle }
    }
}

prop_compose! {
    fn arbitrary_items()(entries in prop::collection::vec((-50i32..50, 0u64..1_000, 0.0f64..1e4), 0..6))
        -> Vec<(i32, u64, f64)> {
        entries
    }
}

prop_compose! {
    fn arbitrary_baseline()(
        durations in prop::array::uniform7(0.0f64..1e6),
        extra in 0.0f64..1e6,
        success_count in 0u64..1_000_000,
        fail_count in 0u64..1_000_000,
        quality in arbitrary_items(),
        errors in arbitrary_items(),
    ) -> StatsSnapshot {
        let mut snapshot = StatsSnapshot {
            idle_duration: durations[0],
            exe_duration: durations[1],
            held_duration: durations[2],
            susp_duration: durations[3],
            cmplt_duration: durations[4],
            stop_duration: durations[5],
            abort_duration: durations[6],
            duration: durations.iter().sum::<f64>() + extra,
            success_count,
            fail_count,
            ..StatsSnapshot::default()
        };
        for (id, count, duration) in quality {
            snapshot.itemized_quality_map.insert(id, StatsItem { id, count, duration });
        }
        for (id, count, duration) in errors {
            snapshot.itemized_error_map.insert(id, StatsItem { id, count, duration });
        }
        snapshot
    }
}

fn raw(snapshot: &StatsSnapshot) -> StatsSnapshot {
    StatsSnapshot {
        cycle_count: 0,
        throughput: 0.0,
        availability: 0.0,
        performance: 0.0,
        quality: 0.0,
        overall_equipment_effectiveness: 0.0,
        ..snapshot.clone()
    }
}

proptest! {
    #[test]
    fn activation_events_never_have_rows(
        mode in arbitrary_mode(),
        state in arbitrary_state(),
    ) {
        let graph = TransitionGraph::new(mode);
        prop_assert!(!graph.accepts(state, Event::Activate));
        prop_assert!(!graph.accepts(state, Event::Deactivate));
    }

    #[test]
    fn graph_lookup_is_deterministic(
        mode in arbitrary_mode(),
        state in arbitrary_state(),
        event in arbitrary_event(),
    ) {
        let graph = TransitionGraph::new(mode);
        prop_assert_eq!(graph.next(state, event), graph.next(state, event));
        prop_assert_eq!(graph.accepts(state, event), graph.next(state, event).is_some());
    }

    #[test]
    fn abort_reaches_aborting_from_everywhere_but_the_abort_path(
        mode in arbitrary_mode(),
        state in arbitrary_state(),
    ) {
        let graph = TransitionGraph::new(mode);
        let expected = match state {
            StateId::Aborting | StateId::Aborted => None,
            _ => Some(StateId::Aborting),
        };
        prop_assert_eq!(graph.next(state, Event::Abort), expected);
    }

    #[test]
    fn default_graphs_have_no_error_rows(
        mode in arbitrary_mode(),
        state in arbitrary_state(),
    ) {
        prop_assert!(!TransitionGraph::new(mode).accepts(state, Event::Error));
    }

    #[test]
    fn modes_differ_only_around_execute_completion(
        state in arbitrary_state(),
        event in arbitrary_event(),
    ) {
        let single = TransitionGraph::single_cycle();
        let continuous = TransitionGraph::continuous();
        let differs = single.next(state, event) != continuous.next(state, event);
        let expected = event == Event::StateComplete
            && matches!(state, StateId::Execute | StateId::Completing);
        prop_assert_eq!(differs, expected);
    }

    #[test]
    fn quality_is_success_ratio(success in 0u64..500, fail in 0u64..500) {
        let mut stats = StatsAggregator::default();
        for _ in 0..success {
            stats.increment_success_count();
        }
        for _ in 0..fail {
            stats.increment_failure_count();
        }

        let snapshot = stats.take_incremental();
        prop_assert_eq!(snapshot.cycle_count, success + fail);
        if success + fail == 0 {
            prop_assert_eq!(snapshot.quality, 0.0);
        } else {
            let expected = success as f64 / (success + fail) as f64;
            prop_assert!((snapshot.quality - expected).abs() < 1e-12);
        }
        prop_assert!((0.0..=1.0).contains(&snapshot.quality));
    }

    #[test]
    fn load_round_trips_through_cumulative_view(baseline in arbitrary_baseline()) {
        let at = Instant::now();
        let mut stats = StatsAggregator::starting_at(DEFAULT_THROUGHPUT_UNIT, at);
        stats.load_at(&baseline, at).unwrap();

        let snapshot = stats.snapshot_at(at);
        prop_assert_eq!(raw(&snapshot), raw(&baseline));
        prop_assert_eq!(snapshot.cycle_count, baseline.success_count + baseline.fail_count);
    }

    #[test]
    fn incremental_durations_cover_the_transaction(
        stays in prop::collection::vec((arbitrary_state(), 1u64..5_000), 1..20),
    ) {
        let t0 = Instant::now();
        let mut stats = StatsAggregator::starting_at(DEFAULT_THROUGHPUT_UNIT, t0);
        let mut at = t0;
        for (state, millis) in &stays {
            stats.state_entered(*state, at);
            at += Duration::from_millis(*millis);
        }

        let snapshot = stats.take_incremental_at(at);
        let elapsed = (at - t0).as_secs_f64();
        prop_assert!((snapshot.duration - elapsed).abs() < 1e-9);
        prop_assert!(snapshot.categorized_duration() <= snapshot.duration + 1e-9);
        prop_assert!(snapshot.availability > -1e-9 && snapshot.availability < 1.0 + 1e-9);

        let next = stats.take_incremental_at(at);
        prop_assert_eq!(next.duration, 0.0);
        prop_assert_eq!(next.categorized_duration(), 0.0);
    }
}
