//! Reconstruction cache: idempotence and range-aware lazy invalidation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use persona_core::config::PersonaConfig;
use persona_core::models::*;
use persona_core::traits::ITemporalQuery;
use persona_temporal::{ExtractionStrategy, KeywordSignalExtractor, TemporalEngine};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

fn event(at: DateTime<Utc>, delta: f64) -> NewEvent {
    NewEvent::new(at, EventKind::Interaction, StateDelta::new().with("trust", delta))
}

/// (event log reads, snapshot reads)
fn reads(engine: &TemporalEngine) -> (u64, u64) {
    let stats = engine.stats();
    (stats.event_log_reads, stats.snapshot_reads)
}

fn seeded() -> TemporalEngine {
    let engine = TemporalEngine::new(PersonaConfig::default()).unwrap();
    engine.capture_snapshot(t0(), engine.schema().baseline()).unwrap();
    engine.append(event(t0() + Duration::days(1), 1.0)).unwrap();
    engine
}

#[test]
fn repeated_reconstruction_is_served_without_store_access() {
    let engine = seeded();
    let target = t0() + Duration::days(2);

    let first = engine.reconstruct(target, Depth::Core, None).unwrap();
    let after_first = reads(&engine);
    let second = engine.reconstruct(target, Depth::Core, None).unwrap();

    assert_eq!(first, second);
    assert_eq!(reads(&engine), after_first);
    assert_eq!(engine.stats().cache.hits, 1);
}

#[test]
fn append_invalidates_only_targets_at_or_after_it() {
    let engine = seeded();
    let early = t0() + Duration::hours(30);
    let late = t0() + Duration::days(3);

    let early_before = engine.reconstruct(early, Depth::Core, None).unwrap();
    let late_before = engine.reconstruct(late, Depth::Core, None).unwrap();

    engine.append(event(t0() + Duration::days(2), 2.0)).unwrap();

    let before_reads = reads(&engine);
    let early_after = engine.reconstruct(early, Depth::Core, None).unwrap();
    assert_eq!(early_after, early_before);
    assert_eq!(reads(&engine), before_reads, "early target must come from cache");

    let late_after = engine.reconstruct(late, Depth::Core, None).unwrap();
    assert_ne!(late_after.state, late_before.state);
    assert_eq!(late_after.state.get("trust"), Some(8.0));
    assert!(reads(&engine).0 > before_reads.0);
    assert_eq!(engine.stats().cache.stale, 1);
}

#[test]
fn append_at_exact_target_invalidates_it() {
    let engine = seeded();
    let target = t0() + Duration::days(2);
    engine.reconstruct(target, Depth::Core, None).unwrap();
    engine.append(event(target, 1.0)).unwrap();
    let r = engine.reconstruct(target, Depth::Core, None).unwrap();
    assert_eq!(r.state.get("trust"), Some(7.0));
}

#[test]
fn snapshot_put_invalidates_later_targets() {
    let engine = seeded();
    let target = t0() + Duration::days(5);
    let before = engine.reconstruct(target, Depth::Core, None).unwrap();
    assert_eq!(before.basis, Basis::Replayed);

    engine.checkpoint(Some(target)).unwrap();
    let after = engine.reconstruct(target, Depth::Core, None).unwrap();
    assert_eq!(after.basis, Basis::SnapshotExact);
    assert_eq!(after.state, before.state);
}

#[test]
fn context_is_part_of_the_key() {
    let engine = seeded().with_signal_extractor(ExtractionStrategy::Keyword(
        KeywordSignalExtractor::with_default_rules(),
    ));
    let target = t0() + Duration::days(2);
    let grateful = ReconstructionContext::new(vec![InteractionRecord::new(target, "thank you")]);
    let hurt = ReconstructionContext::new(vec![InteractionRecord::new(target, "you betrayed me")]);

    let a = engine.reconstruct(target, Depth::Contextual, Some(&grateful)).unwrap();
    let b = engine.reconstruct(target, Depth::Contextual, Some(&hurt)).unwrap();
    assert!(a.state.get("trust").unwrap() > b.state.get("trust").unwrap());

    // core depth ignores the context entirely
    let before = reads(&engine);
    let c1 = engine.reconstruct(target, Depth::Core, Some(&grateful)).unwrap();
    let c2 = engine.reconstruct(target, Depth::Core, Some(&hurt)).unwrap();
    assert_eq!(c1, c2);
    assert_eq!(reads(&engine).0, before.0 + 1);
}

#[test]
fn disabled_cache_always_recomputes() {
    let engine = TemporalEngine::new(PersonaConfig::from_toml("[cache]\nenabled = false").unwrap()).unwrap();
    engine.append(event(t0(), 1.0)).unwrap();
    let target = t0() + Duration::days(1);
    let first = engine.reconstruct(target, Depth::Core, None).unwrap();
    let r1 = reads(&engine);
    let second = engine.reconstruct(target, Depth::Core, None).unwrap();
    assert_eq!(first, second);
    assert!(reads(&engine).0 > r1.0);
}
