//! Benchmarks: append, cold and cached reconstruction, forecasting.

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};

use chrono::{DateTime, Duration, TimeZone, Utc};
use persona_core::config::PersonaConfig;
use persona_core::models::*;
use persona_core::traits::ITemporalQuery;
use persona_temporal::TemporalEngine;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

fn event(i: i64) -> NewEvent {
    NewEvent::new(
        t0() + Duration::minutes(i),
        EventKind::Interaction,
        StateDelta::new().with("trust", if i % 2 == 0 { 0.3 } else { -0.2 }),
    )
}

fn engine_with(events: i64, snapshot_every: i64, cache: bool) -> TemporalEngine {
    let mut config = PersonaConfig::default();
    config.cache.enabled = cache;
    let engine = TemporalEngine::new(config).unwrap();
    for i in 0..events {
        engine.append(event(i)).unwrap();
        if snapshot_every > 0 && i % snapshot_every == snapshot_every - 1 {
            engine.checkpoint(None).unwrap();
        }
    }
    engine
}

fn bench_append_single(c: &mut Criterion) {
    c.bench_function("append_single", |b| {
        b.iter_batched(
            || TemporalEngine::new(PersonaConfig::default()).unwrap(),
            |engine| engine.append(event(0)).unwrap(),
            BatchSize::SmallInput,
        )
    });
}

fn bench_reconstruct_cold_10k(c: &mut Criterion) {
    let engine = engine_with(10_000, 0, false);
    let target = t0() + Duration::minutes(9_999);
    c.bench_function("reconstruct_cold_10k_events", |b| {
        b.iter(|| engine.reconstruct(target, Depth::Core, None).unwrap())
    });
}

fn bench_reconstruct_snapshot_plus_50(c: &mut Criterion) {
    let engine = engine_with(10_000, 100, false);
    let target = t0() + Duration::minutes(9_949);
    c.bench_function("reconstruct_snapshot_plus_50", |b| {
        b.iter(|| engine.reconstruct(target, Depth::Core, None).unwrap())
    });
}

fn bench_reconstruct_cached(c: &mut Criterion) {
    let engine = engine_with(10_000, 100, true);
    let target = t0() + Duration::minutes(9_949);
    engine.reconstruct(target, Depth::Core, None).unwrap();
    c.bench_function("reconstruct_cached", |b| {
        b.iter(|| engine.reconstruct(target, Depth::Core, None).unwrap())
    });
}

fn bench_forecast_snapshots(c: &mut Criterion) {
    let engine = engine_with(10_000, 100, true);
    let window = SampleWindow::snapshots(t0(), t0() + Duration::minutes(10_000));
    c.bench_function("forecast_100_snapshots", |b| {
        b.iter(|| engine.forecast("trust", &window, Duration::days(7)).unwrap())
    });
}

criterion_group!(
    benches,
    bench_append_single,
    bench_reconstruct_cold_10k,
    bench_reconstruct_snapshot_plus_50,
    bench_reconstruct_cached,
    bench_forecast_snapshots
);
criterion_main!(benches);
