//! Reconstruction confidence scoring.

use serde::{Deserialize, Serialize};

/// Knobs for the reconstruction confidence score.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// e-folding time of the snapshot-distance factor.
    pub distance_decay_days: f64,
    /// Lower bound of the snapshot-distance factor.
    pub min_distance_factor: f64,
    /// Per-event penalty: `1 / (1 + penalty * events)`.
    pub replay_penalty: f64,
    /// Contextual depth requested but no usable signal.
    pub missing_context_factor: f64,
    /// Replay range reaches into compacted history.
    pub archived_gap_factor: f64,
    /// Cap for `replayed` results. Only exact snapshots reach 1.0.
    pub replayed_ceiling: f64,
    /// Cap for `extrapolated-backward` results.
    pub backward_ceiling: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            distance_decay_days: 90.0,
            min_distance_factor: 0.3,
            replay_penalty: 0.005,
            missing_context_factor: 0.9,
            archived_gap_factor: 0.75,
            replayed_ceiling: 0.99,
            backward_ceiling: 0.5,
        }
    }
}
