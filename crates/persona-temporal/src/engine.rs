//! TemporalEngine — central orchestrator implementing ITemporalQuery.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use persona_core::config::PersonaConfig;
use persona_core::errors::{PersonaError, PersonaResult, TemporalError};
use persona_core::models::{
    Basis, ContextFingerprint, Depth, DimensionSchema, Divergence, EventId, Forecast, NewEvent,
    ReconstructionContext, ReconstructionResult, Sample, SampleWindow, Sampling, Snapshot,
    SnapshotReason, StateEvent, StateVector,
};
use persona_core::traits::ITemporalQuery;

use crate::cache::{CacheKey, CacheStats, ReconstructionCache};
use crate::cancellation::Cancellation;
use crate::divergence;
use crate::event_store::{compaction, CompactionResult};
use crate::forecast;
use crate::reconstruct::{self, ReconstructSettings};
use crate::signal::ExtractionStrategy;
use crate::snapshot::{checkpoint, integrity, AdaptiveSnapshotTrigger, IntegrityReport};
use crate::timeline::{Timeline, TimelineState};

/// Outcome of one [`TemporalEngine::maintain`] pass.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceReport {
    pub snapshot: Option<Snapshot>,
    pub compaction: CompactionResult,
}

/// Point-in-time counters.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStats {
    pub event_count: usize,
    pub snapshot_count: usize,
    pub generation: u64,
    pub event_log_reads: u64,
    pub snapshot_reads: u64,
    pub compacted_through: Option<DateTime<Utc>>,
    pub cache: CacheStats,
}

/// The persona temporal store for one subject.
///
/// Writes (appends, snapshots, compaction) take the timeline write lock and
/// advance the generation clock in the same critical section. Queries copy
/// their replay inputs under the read lock and do the work lock-free, so
/// they are safe to run from many threads at once.
pub struct TemporalEngine {
    pub(crate) config: PersonaConfig,
    pub(crate) schema: Arc<DimensionSchema>,
    pub(crate) timeline: Timeline,
    cache: ReconstructionCache,
    extractor: ExtractionStrategy,
    trigger: AdaptiveSnapshotTrigger,
}

impl TemporalEngine {
    /// Create an empty store for the configured dimensions.
    pub fn new(config: PersonaConfig) -> PersonaResult<Self> {
        config.validate()?;
        let schema = Arc::new(config.schema()?);
        let state = TimelineState::new(Arc::clone(&schema));
        Ok(Self::from_parts(config, schema, state))
    }

    pub(crate) fn from_parts(
        config: PersonaConfig,
        schema: Arc<DimensionSchema>,
        state: TimelineState,
    ) -> Self {
        Self {
            cache: ReconstructionCache::new(&config.cache),
            trigger: AdaptiveSnapshotTrigger::new(config.temporal.clone()),
            extractor: ExtractionStrategy::Disabled,
            timeline: Timeline::new(state),
            schema,
            config,
        }
    }

    /// Use `strategy` for contextual reconstructions.
    pub fn with_signal_extractor(mut self, strategy: ExtractionStrategy) -> Self {
        self.extractor = strategy;
        self.cache.invalidate_all();
        self
    }

    pub fn schema(&self) -> &DimensionSchema {
        &self.schema
    }

    pub fn config(&self) -> &PersonaConfig {
        &self.config
    }

    // ── Writes ──────────────────────────────────────────────────────────

    /// Append one event. Rejected events leave the log untouched.
    pub fn append(&self, event: NewEvent) -> PersonaResult<EventId> {
        let mut guard = self.timeline.write();
        let state = &mut *guard;
        let checkpoint = state.snapshots.latest_timestamp();
        let timestamp = event.timestamp;
        match state.log.append_after(event, checkpoint) {
            Ok(id) => {
                let generation = state.clock.advance(timestamp);
                debug!("appended {id} at {timestamp} (generation {generation})");
                Ok(id)
            }
            Err(e) => {
                warn!("rejected event at {timestamp}: {e}");
                Err(e.into())
            }
        }
    }

    /// Append several events; either all land or none do.
    pub fn append_batch(&self, events: Vec<NewEvent>) -> PersonaResult<Vec<EventId>> {
        let timestamps: Vec<DateTime<Utc>> = events.iter().map(|e| e.timestamp).collect();
        let mut guard = self.timeline.write();
        let state = &mut *guard;
        let checkpoint = state.snapshots.latest_timestamp();
        let ids = state.log.append_batch(events, checkpoint).map_err(|e| {
            warn!("rejected batch of {}: {e}", timestamps.len());
            PersonaError::from(e)
        })?;
        for timestamp in timestamps {
            state.clock.advance(timestamp);
        }
        Ok(ids)
    }

    /// Store a caller-supplied full state as a snapshot at `timestamp`.
    ///
    /// The state must name every dimension within bounds.
    pub fn capture_snapshot(&self, timestamp: DateTime<Utc>, state: StateVector) -> PersonaResult<()> {
        let mut guard = self.timeline.write();
        let inner = &mut *guard;
        let events = inner.log.since(None);
        let end = events.partition_point(|e| e.timestamp <= timestamp);
        let last_event_id = events[..end].last().map(|e| e.id);
        inner
            .snapshots
            .put(timestamp, state, SnapshotReason::OnDemand, last_event_id)?;
        inner.clock.advance(timestamp);
        info!("captured snapshot at {timestamp}");
        Ok(())
    }

    /// Materialize the replayed state at `at` (default: the last event) as
    /// a snapshot.
    pub fn checkpoint(&self, at: Option<DateTime<Utc>>) -> PersonaResult<Snapshot> {
        let mut guard = self.timeline.write();
        let at = match at.or_else(|| guard.log.last_timestamp()) {
            Some(at) => at,
            None => {
                return Err(TemporalError::CheckpointFailed(
                    "no timestamp given and the event log is empty".to_string(),
                )
                .into())
            }
        };
        self.checkpoint_locked(&mut guard, at, SnapshotReason::OnDemand)
    }

    fn checkpoint_locked(
        &self,
        state: &mut TimelineState,
        at: DateTime<Utc>,
        reason: SnapshotReason,
    ) -> PersonaResult<Snapshot> {
        let folded = checkpoint::fold_at(&self.schema, &state.log, &state.snapshots, at);
        state
            .snapshots
            .put(at, folded.state.clone(), reason, folded.last_event_id)?;
        state.clock.advance(at);
        info!(
            "checkpoint at {at} ({}, {} events folded)",
            reason.as_str(),
            folded.events_folded
        );
        Ok(Snapshot {
            timestamp: at,
            state: folded.state,
            reason,
            last_event_id: folded.last_event_id,
        })
    }

    /// Archive history behind the retained snapshots. Archived events are
    /// returned for the caller to persist.
    pub fn compact(&self) -> PersonaResult<CompactionResult> {
        let mut guard = self.timeline.write();
        Ok(self.compact_locked(&mut guard))
    }

    fn compact_locked(&self, state: &mut TimelineState) -> CompactionResult {
        let result = compaction::compact(
            &mut state.log,
            &state.snapshots,
            self.config.temporal.compaction_retain_snapshots,
        );
        if let Some(through) = result.compacted_through {
            // Confidence for any replay reaching into the archive changes.
            state.clock.advance(DateTime::<Utc>::MIN_UTC);
            info!(
                "compacted {} event(s) through {through}",
                result.events_moved()
            );
        }
        result
    }

    /// Snapshot if the adaptive trigger fires, then compact.
    pub fn maintain(&self) -> PersonaResult<MaintenanceReport> {
        let mut guard = self.timeline.write();
        let state = &mut *guard;

        let (reason, at) = {
            let since = state.log.since(state.snapshots.latest_timestamp());
            (
                self.trigger.should_snapshot(since),
                since.last().map(|e| e.timestamp),
            )
        };

        let snapshot = match (reason, at) {
            (Some(reason), Some(at)) => Some(self.checkpoint_locked(state, at, reason)?),
            _ => None,
        };
        let compaction = self.compact_locked(state);
        Ok(MaintenanceReport {
            snapshot,
            compaction,
        })
    }

    /// Check every consecutive snapshot pair against event replay.
    pub fn verify_integrity(&self) -> IntegrityReport {
        let state = self.timeline.read();
        integrity::verify_replay_invariant(
            &self.schema,
            &state.log,
            &state.snapshots,
            self.config.temporal.replay_tolerance,
        )
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// [`ITemporalQuery::reconstruct`] with a cancellation signal.
    pub fn reconstruct_cancellable(
        &self,
        target: DateTime<Utc>,
        depth: Depth,
        context: Option<&ReconstructionContext>,
        cancel: &Cancellation,
    ) -> PersonaResult<ReconstructionResult> {
        cancel.check("reconstruct")?;
        let key = CacheKey {
            target,
            depth,
            context: if depth.blends_context() {
                ContextFingerprint::of(context)
            } else {
                ContextFingerprint::NONE
            },
        };

        let view = {
            let state = self.timeline.read();
            if let Some(hit) = self.cache.lookup(&key, &state.clock) {
                return Ok(hit);
            }
            state.view_at(target)
        };
        let generation = view.generation;

        let result = reconstruct::reconstruct_from(
            &self.schema,
            view,
            target,
            depth,
            context,
            ReconstructSettings {
                extractor: &self.extractor,
                blending: &self.config.blending,
                confidence: &self.config.confidence,
                cancel_check_interval: self.config.temporal.cancel_check_interval,
            },
            cancel,
        )?;
        debug!(
            "reconstructed {target} via {} ({} events, confidence {:.3})",
            result.basis.as_str(),
            result.events_replayed,
            result.confidence
        );
        self.cache.insert(key, result.clone(), generation);
        Ok(result)
    }

    /// [`ITemporalQuery::forecast`] with a cancellation signal.
    pub fn forecast_cancellable(
        &self,
        dimension: &str,
        window: &SampleWindow,
        horizon: Duration,
        cancel: &Cancellation,
    ) -> PersonaResult<Forecast> {
        let spec = self.schema.require(dimension)?;
        let horizon_units = self.horizon_units(horizon)?;
        let samples = self.collect_samples(window, cancel)?;
        let series = series_for(&samples, &spec.name, spec.baseline);
        forecast::forecast_series(spec, &series, horizon_units, &self.config.forecast)
    }

    /// Forecast every dimension over the same samples and assemble the
    /// projected state. Dimensions are analyzed in parallel.
    pub fn forecast_state(
        &self,
        window: &SampleWindow,
        horizon: Duration,
        cancel: &Cancellation,
    ) -> PersonaResult<ReconstructionResult> {
        let horizon_units = self.horizon_units(horizon)?;
        let samples = self.collect_samples(window, cancel)?;
        let Some(last) = samples.last().map(|(t, _)| *t) else {
            return Err(PersonaError::insufficient_data("*", "no samples in window"));
        };
        let target = last.checked_add_signed(horizon).ok_or_else(|| {
            PersonaError::InvalidQuery(format!(
                "forecast horizon {horizon} from {last} is past the representable range"
            ))
        })?;

        let forecasts = self
            .schema
            .specs()
            .par_iter()
            .map(|spec| {
                cancel.check("forecast")?;
                let series = series_for(&samples, &spec.name, spec.baseline);
                forecast::forecast_series(spec, &series, horizon_units, &self.config.forecast)
            })
            .collect::<PersonaResult<Vec<Forecast>>>()?;

        let values: BTreeMap<String, f64> = forecasts
            .iter()
            .map(|f| (f.dimension.clone(), f.projected_value))
            .collect();
        let confidence =
            forecasts.iter().map(|f| f.confidence).sum::<f64>() / forecasts.len().max(1) as f64;

        Ok(ReconstructionResult {
            target,
            state: self.schema.state_clamped(&values)?,
            confidence,
            basis: Basis::Forecast,
            anchor: Some(last),
            events_replayed: 0,
            signals_blended: 0,
        })
    }

    /// [`ITemporalQuery::compare`] with a cancellation signal.
    pub fn compare_cancellable(
        &self,
        a: DateTime<Utc>,
        b: DateTime<Utc>,
        cancel: &Cancellation,
    ) -> PersonaResult<Divergence> {
        let from = self.reconstruct_cancellable(a, Depth::Core, None, cancel)?;
        let to = self.reconstruct_cancellable(b, Depth::Core, None, cancel)?;
        Ok(divergence::compare_states(
            &self.schema,
            &from.state,
            &to.state,
            &self.config.forecast,
        ))
    }

    fn horizon_units(&self, horizon: Duration) -> PersonaResult<f64> {
        if horizon < Duration::zero() {
            return Err(PersonaError::InvalidQuery(format!(
                "forecast horizon must not be negative, got {horizon}"
            )));
        }
        let unit_millis = self.config.forecast.time_unit_secs.max(1) as f64 * 1000.0;
        Ok(horizon.num_milliseconds() as f64 / unit_millis)
    }

    fn collect_samples(
        &self,
        window: &SampleWindow,
        cancel: &Cancellation,
    ) -> PersonaResult<Vec<(DateTime<Utc>, StateVector)>> {
        match window.sampling {
            Sampling::Snapshots => {
                let state = self.timeline.read();
                Ok(state
                    .snapshots
                    .in_window(window.start, window.end)
                    .into_iter()
                    .map(|s| (s.timestamp, s.state))
                    .collect())
            }
            Sampling::Every(step) => {
                if step.num_milliseconds() <= 0 {
                    return Err(PersonaError::InvalidQuery(format!(
                        "sampling step must be at least 1ms, got {step}"
                    )));
                }
                if window.start > window.end {
                    return Ok(Vec::new());
                }
                let count = (window.end - window.start).num_milliseconds() / step.num_milliseconds() + 1;
                if count as u64 > self.config.forecast.max_samples as u64 {
                    return Err(PersonaError::InvalidQuery(format!(
                        "window needs {count} samples, limit is {}",
                        self.config.forecast.max_samples
                    )));
                }

                let mut samples = Vec::with_capacity(count as usize);
                let mut t = window.start;
                while t <= window.end {
                    cancel.check("forecast sampling")?;
                    let result = self.reconstruct_cancellable(t, Depth::Core, None, cancel)?;
                    samples.push((t, result.state));
                    // Past the representable range means past window.end too.
                    match t.checked_add_signed(step) {
                        Some(next) => t = next,
                        None => break,
                    }
                }
                Ok(samples)
            }
        }
    }

    // ── Inspection ──────────────────────────────────────────────────────

    pub fn events(&self) -> Vec<StateEvent> {
        self.timeline.read().log.iter().cloned().collect()
    }

    pub fn snapshots(&self) -> Vec<Snapshot> {
        self.timeline.read().snapshots.iter().cloned().collect()
    }

    pub fn current_generation(&self) -> u64 {
        self.timeline.read().clock.current()
    }

    pub fn stats(&self) -> EngineStats {
        let state = self.timeline.read();
        EngineStats {
            event_count: state.log.len(),
            snapshot_count: state.snapshots.len(),
            generation: state.clock.current(),
            event_log_reads: state.log.reads(),
            snapshot_reads: state.snapshots.reads(),
            compacted_through: state.log.compacted_through(),
            cache: self.cache.stats(),
        }
    }
}

fn series_for(samples: &[(DateTime<Utc>, StateVector)], dimension: &str, fallback: f64) -> Vec<Sample> {
    samples
        .iter()
        .map(|(t, state)| Sample::new(*t, state.get(dimension).unwrap_or(fallback)))
        .collect()
}

impl ITemporalQuery for TemporalEngine {
    fn reconstruct(
        &self,
        target: DateTime<Utc>,
        depth: Depth,
        context: Option<&ReconstructionContext>,
    ) -> PersonaResult<ReconstructionResult> {
        self.reconstruct_cancellable(target, depth, context, &Cancellation::new())
    }

    fn forecast(
        &self,
        dimension: &str,
        window: &SampleWindow,
        horizon: Duration,
    ) -> PersonaResult<Forecast> {
        self.forecast_cancellable(dimension, window, horizon, &Cancellation::new())
    }

    fn compare(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> PersonaResult<Divergence> {
        self.compare_cancellable(a, b, &Cancellation::new())
    }
}

impl std::fmt::Debug for TemporalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalEngine")
            .field("dimensions", &self.schema.len())
            .field("extractor", &self.extractor)
            .field("cache", &self.cache)
            .finish()
    }
}
