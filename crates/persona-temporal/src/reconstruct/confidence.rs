//! Reconstruction confidence scoring.

use chrono::Duration;

use persona_core::config::ConfidenceConfig;
use persona_core::models::Basis;

const SECS_PER_DAY: f64 = 86_400.0;

/// Whether contextual signals were asked for and present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSignal {
    /// Core depth.
    NotRequested,
    /// Contextual depth with no usable interactions.
    Missing,
    /// Contextual depth with at least one blended signal.
    Blended,
}

/// Everything the score depends on.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceInputs {
    pub basis: Basis,
    /// Distance between the anchor (or first replayed event) and the target.
    pub gap: Duration,
    pub events_replayed: usize,
    pub context: ContextSignal,
    /// The replay range overlaps compacted history.
    pub crosses_archive: bool,
}

/// Score in `[0, 1]`.
///
/// `min(time × replay, ceiling) × context × archive`. The ceiling depends
/// on the basis; the context and archive penalties apply below it, so they
/// still lower a capped backward extrapolation. Exact snapshot hits are 1.0.
pub fn score(inputs: &ConfidenceInputs, config: &ConfidenceConfig) -> f64 {
    if inputs.basis == Basis::SnapshotExact {
        return 1.0;
    }

    let gap_days = (inputs.gap.num_seconds().max(0) as f64) / SECS_PER_DAY;
    let time_factor = if config.distance_decay_days > 0.0 {
        (-gap_days / config.distance_decay_days)
            .exp()
            .max(config.min_distance_factor)
    } else {
        1.0
    };

    let replay_factor = 1.0 / (1.0 + config.replay_penalty.max(0.0) * inputs.events_replayed as f64);

    let context_factor = match inputs.context {
        ContextSignal::Missing => config.missing_context_factor,
        ContextSignal::NotRequested | ContextSignal::Blended => 1.0,
    };

    let archive_factor = if inputs.crosses_archive {
        config.archived_gap_factor
    } else {
        1.0
    };

    let ceiling = match inputs.basis {
        Basis::ExtrapolatedBackward => config.backward_ceiling,
        _ => config.replayed_ceiling,
    };

    let replayed = (time_factor * replay_factor).min(ceiling);
    (replayed * context_factor * archive_factor).clamp(0.0, 1.0)
}
