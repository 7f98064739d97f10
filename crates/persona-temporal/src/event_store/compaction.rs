//! Event compaction: move history behind retained snapshots out of the
//! live log.

use chrono::{DateTime, Utc};

use persona_core::models::StateEvent;

use super::log::EventLog;
use crate::snapshot::SnapshotStore;

/// Result of a compaction run. Archived events are handed to the caller,
/// which may persist them; the live log no longer holds them.
#[derive(Debug, Clone, Default)]
pub struct CompactionResult {
    pub archived: Vec<StateEvent>,
    pub compacted_through: Option<DateTime<Utc>>,
}

impl CompactionResult {
    pub fn events_moved(&self) -> usize {
        self.archived.len()
    }
}

/// Timestamp through which events may be archived: the oldest of the
/// `retain` newest snapshots. `None` when fewer snapshots exist or
/// compaction is disabled (`retain == 0`).
pub fn compaction_boundary(snapshots: &SnapshotStore, retain: usize) -> Option<DateTime<Utc>> {
    if retain == 0 {
        return None;
    }
    snapshots.nth_latest(retain).map(|s| s.timestamp)
}

/// Archive every event at or before the boundary.
///
/// Reconstructions at or after the boundary snapshot are unaffected:
/// they start from that snapshot or a later one.
pub fn compact(log: &mut EventLog, snapshots: &SnapshotStore, retain: usize) -> CompactionResult {
    let Some(boundary) = compaction_boundary(snapshots, retain) else {
        return CompactionResult::default();
    };
    if log.compacted_through().is_some_and(|c| c >= boundary) {
        return CompactionResult::default();
    }
    let archived = log.archive_through(boundary);
    CompactionResult {
        archived,
        compacted_through: Some(boundary),
    }
}
