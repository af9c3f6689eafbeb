//! End-to-end forecaster scenarios.
//!
//! Each test drives the full pipeline from observations (or raw records) to a
//! forecast outcome with a pinned clock.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use signalcast_forecast::{
    AbstainKind, AbstainReason, FixedClock, ForecastConfig, ForecastOutcome, PhaseForecaster,
};
use signalcast_models::{Observation, Phase, RawRecord, StateCodeTable};

const T0: i64 = 1_684_389_600; // 2023-05-18T06:00:00Z

fn ts(secs: i64) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(7200)
        .unwrap()
        .timestamp_opt(T0 + secs, 0)
        .unwrap()
}

fn obs(secs: i64, phase: Phase) -> Observation {
    Observation::with_phase(ts(secs), phase)
}

fn forecaster_at(secs: i64) -> PhaseForecaster<FixedClock> {
    PhaseForecaster::with_clock(
        ForecastConfig::default(),
        StateCodeTable::default(),
        FixedClock::new(Utc.timestamp_opt(T0 + secs, 0).unwrap()),
    )
    .unwrap()
}

fn scenario_a() -> Vec<Observation> {
    vec![
        obs(0, Phase::Red),
        obs(30, Phase::Green),
        obs(60, Phase::Red),
        obs(92, Phase::Green),
        obs(118, Phase::Red),
    ]
}

// =============================================================================
// Scenario A: regular alternation
// =============================================================================

#[test]
fn test_scenario_a_regular_alternation() {
    let outcome = forecaster_at(118).forecast_observations(&scenario_a()).unwrap();
    let forecast = outcome.forecast().expect("regular cycle should forecast");

    assert!(!forecast.clamped);
    assert_eq!(forecast.origin, obs(118, Phase::Red));
    assert_eq!(forecast.statistics.red.mean_seconds, 31.0);
    assert_eq!(forecast.statistics.green.mean_seconds, 28.0);

    let steps = &forecast.steps;
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0].phase, Phase::Green);
    assert_eq!(steps[1].phase, Phase::Red);
    assert!(steps[0].predicted_timestamp > forecast.origin.timestamp());
    assert!(steps[1].predicted_timestamp > steps[0].predicted_timestamp);
    assert_eq!(steps[0].predicted_timestamp, ts(149));
    assert_eq!(steps[1].predicted_timestamp, ts(177));
}

#[test]
fn test_scenario_a_wire_output() {
    let records: Vec<RawRecord> = scenario_a()
        .iter()
        .map(|o| RawRecord::new(o.timestamp().to_rfc3339(), o.state_code()))
        .collect();
    let entries = forecaster_at(118).predict("50850", &records).unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].timestamp, "2023-05-18T08:02:29+02:00");
    assert_eq!(entries[0].state_code, 3);
    assert_eq!(entries[1].timestamp, "2023-05-18T08:02:57+02:00");
    assert_eq!(entries[1].state_code, 1);
}

#[test]
fn test_descending_input_gives_same_forecast() {
    let mut desc = scenario_a();
    desc.reverse();
    let f = forecaster_at(118);
    assert_eq!(
        f.forecast_observations(&desc).unwrap(),
        f.forecast_observations(&scenario_a()).unwrap()
    );
}

#[test]
fn test_transitional_observations_are_skipped_not_zeroed() {
    let mut with_amber = scenario_a();
    with_amber.insert(1, obs(27, Phase::Amber));
    with_amber.insert(3, obs(58, Phase::RedAmber));

    let f = forecaster_at(118);
    assert_eq!(
        f.forecast_observations(&with_amber).unwrap(),
        f.forecast_observations(&scenario_a()).unwrap()
    );
}

// =============================================================================
// Scenario B: irregular red durations
// =============================================================================

#[test]
fn test_scenario_b_low_confidence_abstains() {
    // red durations [10, 90], green durations [30, 30]
    let input = vec![
        obs(0, Phase::Red),
        obs(10, Phase::Green),
        obs(40, Phase::Red),
        obs(130, Phase::Green),
        obs(160, Phase::Red),
    ];
    let outcome = forecaster_at(160).forecast_observations(&input).unwrap();

    assert!(outcome.is_abstained());
    assert!(outcome.to_entries().is_empty());
    match outcome.abstain_reason() {
        Some(AbstainReason::LowConfidence {
            phase,
            coefficient_of_variation,
            threshold,
        }) => {
            assert_eq!(*phase, Phase::Red);
            assert!(*coefficient_of_variation > 0.5);
            assert_eq!(*threshold, 0.5);
        }
        other => panic!("expected low confidence, got {:?}", other),
    }
}

// =============================================================================
// Scenario C: clock past the naive prediction
// =============================================================================

#[test]
fn test_scenario_c_clamp_to_now_plus_one_second() {
    let now = 10_000;
    let outcome = forecaster_at(now).forecast_observations(&scenario_a()).unwrap();
    let forecast = outcome.forecast().unwrap();

    assert!(forecast.clamped);
    assert_eq!(forecast.steps[0].predicted_timestamp, ts(now + 1));
    assert_eq!(forecast.steps[0].phase, Phase::Green);
    // green mean 28s added on top of the clamped step
    assert_eq!(forecast.steps[1].predicted_timestamp, ts(now + 1 + 28));
}

#[test]
fn test_first_prediction_always_after_now() {
    for now in [0, 100, 118, 148, 149, 150, 1_000, 86_400] {
        let outcome = forecaster_at(now).forecast_observations(&scenario_a()).unwrap();
        let first = outcome.forecast().unwrap().steps[0].predicted_timestamp;
        let now_ts = Utc.timestamp_opt(T0 + now, 0).unwrap();
        assert!(first > now_ts, "now={} first={}", now, first);
    }
}

// =============================================================================
// Scenario D and insufficient data
// =============================================================================

#[test]
fn test_scenario_d_only_transitional() {
    let input: Vec<Observation> = (0..6).map(|i| obs(i * 3, Phase::Amber)).collect();
    let outcome = forecaster_at(20).forecast_observations(&input).unwrap();
    assert_eq!(
        outcome,
        ForecastOutcome::Abstained(AbstainReason::InsufficientObservations {
            usable: 0,
            required: 2
        })
    );
}

#[test]
fn test_single_stable_phase_always_rejects() {
    for phase in Phase::STABLE {
        for n in 2..6 {
            let input: Vec<Observation> = (0..n).map(|i| obs(i * 40, phase)).collect();
            let outcome = forecaster_at(0).forecast_observations(&input).unwrap();
            let reason = outcome.abstain_reason().expect("single phase must abstain");
            assert_eq!(reason.kind(), AbstainKind::InsufficientData);
            assert_eq!(
                *reason,
                AbstainReason::MissingPhase {
                    phase: phase.opposite().unwrap()
                }
            );
        }
    }
}

#[test]
fn test_two_observations_is_insufficient_not_crash() {
    let input = vec![obs(0, Phase::Red), obs(30, Phase::Green)];
    let outcome = forecaster_at(30).forecast_observations(&input).unwrap();
    assert_eq!(
        outcome.abstain_reason().map(|r| r.kind()),
        Some(AbstainKind::InsufficientData)
    );
}

#[test]
fn test_duplicate_timestamps_collapse_deterministically() {
    let mut input = scenario_a();
    // a second report at t=118 claiming green; the later report wins
    input.push(obs(118, Phase::Green));
    let f = forecaster_at(118);
    let a = f.forecast_observations(&input).unwrap();
    let b = f.forecast_observations(&input).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.forecast().unwrap().origin.phase(), Phase::Green);
}

#[test]
fn test_custom_threshold_accepts_irregular_cycle() {
    let config = ForecastConfig {
        max_variation_coefficient: 2.0,
        ..Default::default()
    };
    let f = PhaseForecaster::with_clock(
        config,
        StateCodeTable::default(),
        FixedClock::new(Utc.timestamp_opt(T0 + 160, 0).unwrap()),
    )
    .unwrap();
    let input = vec![
        obs(0, Phase::Red),
        obs(10, Phase::Green),
        obs(40, Phase::Red),
        obs(130, Phase::Green),
        obs(160, Phase::Red),
    ];
    let outcome = f.forecast_observations(&input).unwrap();
    assert_eq!(outcome.forecast().unwrap().steps[0].predicted_timestamp, ts(210));
}

#[test]
fn test_one_forecaster_serves_parallel_callers() {
    let forecaster = forecaster_at(118);
    let input = scenario_a();
    let expected = forecaster.forecast_observations(&input).unwrap();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| forecaster.forecast_observations(&input).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
