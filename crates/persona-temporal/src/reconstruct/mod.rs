//! Point-in-time reconstruction: nearest snapshot, replay, optional
//! contextual blending, confidence.

pub mod blending;
pub mod confidence;

use chrono::{DateTime, Duration, Utc};

use persona_core::config::{BlendingConfig, ConfidenceConfig};
use persona_core::errors::PersonaResult;
use persona_core::models::{Basis, Depth, DimensionSchema, ReconstructionContext, ReconstructionResult};
use persona_core::traits::ISignalExtractor;

use crate::cancellation::Cancellation;
use crate::event_store::replay;
use crate::snapshot::Anchor;
use crate::timeline::ReplayView;

use confidence::{ConfidenceInputs, ContextSignal};

/// Tunables and collaborators a reconstruction reads.
#[derive(Clone, Copy)]
pub struct ReconstructSettings<'a> {
    pub extractor: &'a dyn ISignalExtractor,
    pub blending: &'a BlendingConfig,
    pub confidence: &'a ConfidenceConfig,
    pub cancel_check_interval: usize,
}

/// Reconstruct the state at `target` from a view copied out of the timeline.
///
/// Algorithm:
/// 1. Exact snapshot hit: return it verbatim, confidence 1.0
/// 2. Replay `(anchor, target]` onto the anchor, clamping every step
/// 3. Contextual depth: blend extracted interaction signals
/// 4. Score confidence from distance, replay length, context, archive gaps
pub fn reconstruct_from(
    schema: &DimensionSchema,
    view: ReplayView,
    target: DateTime<Utc>,
    depth: Depth,
    context: Option<&ReconstructionContext>,
    settings: ReconstructSettings<'_>,
    cancel: &Cancellation,
) -> PersonaResult<ReconstructionResult> {
    let ReplayView {
        anchor,
        events,
        compacted_through,
        ..
    } = view;

    if let Anchor::Snapshot(snapshot) = &anchor {
        if snapshot.timestamp == target {
            return Ok(ReconstructionResult {
                target,
                state: snapshot.state.clone(),
                confidence: 1.0,
                basis: Basis::SnapshotExact,
                anchor: Some(snapshot.timestamp),
                events_replayed: 0,
                signals_blended: 0,
            });
        }
    }

    let anchor_ts = anchor.timestamp();
    let basis = if anchor.is_snapshot() {
        Basis::Replayed
    } else {
        Basis::ExtrapolatedBackward
    };
    let gap = match anchor_ts.or_else(|| events.first().map(|e| e.timestamp)) {
        Some(from) => target - from,
        None => Duration::zero(),
    };
    let crosses_archive = match (compacted_through, anchor_ts) {
        (Some(_), None) => true,
        (Some(through), Some(from)) => from < through,
        (None, _) => false,
    };

    let mut state = replay::replay_cancellable(
        schema,
        &events,
        anchor.into_state(),
        cancel,
        settings.cancel_check_interval,
    )?;

    let mut signals_blended = 0;
    let context_signal = if depth.blends_context() {
        if let Some(ctx) = context.filter(|c| !c.is_empty()) {
            cancel.check("context blending")?;
            signals_blended = blending::blend_signals(
                schema,
                &mut state,
                target,
                ctx,
                settings.extractor,
                settings.blending,
            );
        }
        if signals_blended > 0 {
            ContextSignal::Blended
        } else {
            ContextSignal::Missing
        }
    } else {
        ContextSignal::NotRequested
    };

    let confidence = confidence::score(
        &ConfidenceInputs {
            basis,
            gap,
            events_replayed: events.len(),
            context: context_signal,
            crosses_archive,
        },
        settings.confidence,
    );

    Ok(ReconstructionResult {
        target,
        state,
        confidence,
        basis,
        anchor: anchor_ts,
        events_replayed: events.len(),
        signals_blended,
    })
}
