//! Adaptive snapshot trigger evaluation.

use persona_core::config::TemporalConfig;
use persona_core::models::{SnapshotReason, StateEvent};

/// Decides when the live log has grown enough to deserve a checkpoint.
#[derive(Debug, Clone)]
pub struct AdaptiveSnapshotTrigger {
    config: TemporalConfig,
}

impl AdaptiveSnapshotTrigger {
    pub fn new(config: TemporalConfig) -> Self {
        Self { config }
    }

    /// Evaluate the events appended since the latest snapshot.
    ///
    /// A high-significance event wins over the plain count threshold.
    pub fn should_snapshot(&self, events_since_snapshot: &[StateEvent]) -> Option<SnapshotReason> {
        if events_since_snapshot.is_empty() {
            return None;
        }

        if events_since_snapshot
            .iter()
            .any(|e| e.significance.value() >= self.config.snapshot_significance_threshold)
        {
            return Some(SnapshotReason::SignificantEvent);
        }

        if events_since_snapshot.len() as u64 >= self.config.snapshot_event_threshold {
            return Some(SnapshotReason::EventThreshold);
        }

        None
    }
}
