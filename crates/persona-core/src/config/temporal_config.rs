//! Event log, snapshot, and maintenance configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the event log and snapshot subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    // Snapshot triggers
    pub snapshot_event_threshold: u64,
    pub snapshot_significance_threshold: u8,

    // Compaction: snapshots whose history stays live
    pub compaction_retain_snapshots: usize,

    // Replay
    pub replay_tolerance: f64,
    pub cancel_check_interval: usize,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            snapshot_event_threshold: 50,
            snapshot_significance_threshold: 9,
            compaction_retain_snapshots: 4,
            replay_tolerance: 1e-6,
            cancel_check_interval: 256,
        }
    }
}
