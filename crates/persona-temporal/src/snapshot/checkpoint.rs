//! Checkpoint folding: materialize the state at an instant as a snapshot.

use chrono::{DateTime, Utc};

use persona_core::models::{DimensionSchema, EventId, StateEvent, StateVector};

use super::store::{Anchor, SnapshotStore};
use crate::event_store::{replay, EventLog};

/// State and provenance for a snapshot at `at`.
#[derive(Debug, Clone)]
pub struct FoldedCheckpoint {
    pub state: StateVector,
    pub last_event_id: Option<EventId>,
    pub events_folded: usize,
}

/// Fold every event in `(anchor, at]` onto the nearest anchor.
///
/// The result satisfies the replay invariant by construction: replaying
/// the same slice onto the same anchor yields the same state.
pub fn fold_at(
    schema: &DimensionSchema,
    log: &EventLog,
    snapshots: &SnapshotStore,
    at: DateTime<Utc>,
) -> FoldedCheckpoint {
    let anchor = snapshots.nearest_at_or_before(at);
    let events = log.since(anchor.timestamp());
    let end = events.partition_point(|e| e.timestamp <= at);
    fold_events(schema, anchor, &events[..end])
}

fn fold_events(schema: &DimensionSchema, anchor: Anchor, events: &[StateEvent]) -> FoldedCheckpoint {
    let inherited = match &anchor {
        Anchor::Snapshot(s) => s.last_event_id,
        Anchor::Baseline(_) => None,
    };
    let last_event_id = events.last().map(|e| e.id).or(inherited);
    let state = replay::replay_events(schema, events, anchor.into_state());
    FoldedCheckpoint {
        state,
        last_event_id,
        events_folded: events.len(),
    }
}
