//! Property tests for persona-temporal: bounds, replay invariant,
//! idempotence, forecast clamping.

use proptest::prelude::*;

use chrono::{DateTime, Duration, TimeZone, Utc};
use persona_core::config::{ForecastConfig, PersonaConfig};
use persona_core::models::*;
use persona_core::traits::ITemporalQuery;
use persona_temporal::forecast::forecast_series;
use persona_temporal::TemporalEngine;

const DIMENSIONS: [&str; 4] = ["trust", "autonomy", "protectiveness", "loyalty"];

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

// (minutes after the previous event, dimension index, delta, checkpoint after?)
fn step() -> impl Strategy<Value = (i64, usize, f64, bool)> {
    (0i64..600, 0usize..4, -10.0f64..=10.0, prop::bool::weighted(0.1))
}

fn build(steps: &[(i64, usize, f64, bool)]) -> (TemporalEngine, DateTime<Utc>) {
    let engine = TemporalEngine::new(PersonaConfig::default()).unwrap();
    let mut t = t0();
    for (gap, dim, delta, checkpoint) in steps {
        t += Duration::minutes(*gap + 1);
        engine
            .append(NewEvent::new(
                t,
                EventKind::Interaction,
                StateDelta::new().with(DIMENSIONS[*dim], *delta),
            ))
            .unwrap();
        if *checkpoint {
            engine.checkpoint(None).unwrap();
        }
    }
    (engine, t)
}

fn in_bounds(engine: &TemporalEngine, state: &StateVector) -> bool {
    engine.schema().specs().iter().all(|spec| {
        state
            .get(&spec.name)
            .is_some_and(|v| v >= spec.lower() && v <= spec.upper())
    })
}

proptest! {
    #[test]
    fn prop_reconstructions_stay_in_bounds(
        steps in prop::collection::vec(step(), 1..80),
        probes in prop::collection::vec(0i64..60_000, 1..10),
    ) {
        let (engine, _) = build(&steps);
        for minutes in probes {
            let r = engine.reconstruct(t0() + Duration::minutes(minutes), Depth::Core, None).unwrap();
            prop_assert!(in_bounds(&engine, &r.state));
            prop_assert!((0.0..=1.0).contains(&r.confidence));
        }
    }

    #[test]
    fn prop_checkpoints_satisfy_replay_invariant(
        steps in prop::collection::vec(step(), 1..80),
    ) {
        let (engine, _) = build(&steps);
        let report = engine.verify_integrity();
        prop_assert!(report.is_consistent(), "{:?}", report.violations);
    }

    #[test]
    fn prop_repeated_reconstruction_is_identical(
        steps in prop::collection::vec(step(), 1..40),
        probe in 0i64..30_000,
    ) {
        let (engine, _) = build(&steps);
        let target = t0() + Duration::minutes(probe);
        let a = engine.reconstruct(target, Depth::Core, None).unwrap();
        let b = engine.reconstruct(target, Depth::Core, None).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn prop_cached_result_equals_recomputation_after_append(
        steps in prop::collection::vec(step(), 1..40),
        probe in 0i64..30_000,
        delta in -10.0f64..=10.0,
    ) {
        let (engine, last) = build(&steps);
        let target = t0() + Duration::minutes(probe);
        engine.reconstruct(target, Depth::Core, None).unwrap();
        engine
            .append(NewEvent::new(
                last + Duration::minutes(1),
                EventKind::Correction,
                StateDelta::new().with("trust", delta),
            ))
            .unwrap();

        let cached = engine.reconstruct(target, Depth::Core, None).unwrap();
        let fresh = TemporalEngine::deserialize(PersonaConfig::default(), engine.serialize())
            .unwrap()
            .reconstruct(target, Depth::Core, None)
            .unwrap();
        prop_assert_eq!(cached, fresh);
    }

    #[test]
    fn prop_forecast_is_clamped(
        values in prop::collection::vec(0.0f64..=10.0, 1..30),
        horizon in 0.0f64..365.0,
    ) {
        let spec = DimensionSpec::new("trust", 0.0, 10.0, 5.0).with_floor(2.0);
        let samples: Vec<Sample> = values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample::new(t0() + Duration::days(i as i64), *v))
            .collect();
        let f = forecast_series(&spec, &samples, horizon, &ForecastConfig::default()).unwrap();
        prop_assert!(f.projected_value >= 2.0 && f.projected_value <= 10.0);
        prop_assert!(f.confidence_interval.lower >= 2.0);
        prop_assert!(f.confidence_interval.upper <= 10.0);
        prop_assert!(f.confidence_interval.lower <= f.confidence_interval.upper);
        prop_assert!(f.confidence >= 0.05 && f.confidence <= 1.0);
    }
}
