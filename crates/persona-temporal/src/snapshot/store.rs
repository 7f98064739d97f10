//! Timestamp-keyed snapshot storage with nearest-before lookup.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use persona_core::errors::ValidationError;
use persona_core::models::{DimensionSchema, EventId, Snapshot, SnapshotReason, StateVector};

/// Where a replay starts.
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor {
    /// Latest snapshot at or before the target.
    Snapshot(Snapshot),
    /// No snapshot precedes the target: start from the configured baseline.
    Baseline(StateVector),
}

impl Anchor {
    /// `None` for the baseline, which sits before all history.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Snapshot(s) => Some(s.timestamp),
            Self::Baseline(_) => None,
        }
    }

    pub fn state(&self) -> &StateVector {
        match self {
            Self::Snapshot(s) => &s.state,
            Self::Baseline(state) => state,
        }
    }

    pub fn into_state(self) -> StateVector {
        match self {
            Self::Snapshot(s) => s.state,
            Self::Baseline(state) => state,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, Self::Snapshot(_))
    }
}

/// Full-state checkpoints keyed by timestamp.
///
/// At most one snapshot per timestamp; a later put at the same instant
/// replaces the earlier one.
#[derive(Debug)]
pub struct SnapshotStore {
    schema: Arc<DimensionSchema>,
    snapshots: BTreeMap<DateTime<Utc>, Snapshot>,
    reads: AtomicU64,
}

impl SnapshotStore {
    pub fn new(schema: Arc<DimensionSchema>) -> Self {
        Self {
            schema,
            snapshots: BTreeMap::new(),
            reads: AtomicU64::new(0),
        }
    }

    /// Store a snapshot, returning the one it replaced.
    pub fn put(
        &mut self,
        timestamp: DateTime<Utc>,
        state: StateVector,
        reason: SnapshotReason,
        last_event_id: Option<EventId>,
    ) -> Result<Option<Snapshot>, ValidationError> {
        self.schema.validate_state(&state)?;
        Ok(self.snapshots.insert(
            timestamp,
            Snapshot {
                timestamp,
                state,
                reason,
                last_event_id,
            },
        ))
    }

    /// Latest snapshot with `timestamp <= target`, or the baseline.
    pub fn nearest_at_or_before(&self, target: DateTime<Utc>) -> Anchor {
        self.reads.fetch_add(1, Ordering::Relaxed);
        match self.snapshots.range(..=target).next_back() {
            Some((_, snapshot)) => Anchor::Snapshot(snapshot.clone()),
            None => Anchor::Baseline(self.schema.baseline()),
        }
    }

    pub fn get(&self, timestamp: DateTime<Utc>) -> Option<&Snapshot> {
        self.snapshots.get(&timestamp)
    }

    pub fn earliest(&self) -> Option<&Snapshot> {
        self.snapshots.values().next()
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.snapshots.values().next_back()
    }

    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.snapshots.keys().next_back().copied()
    }

    /// The `n`-th newest snapshot, 1-based.
    pub fn nth_latest(&self, n: usize) -> Option<&Snapshot> {
        if n == 0 {
            return None;
        }
        self.snapshots.values().rev().nth(n - 1)
    }

    /// Snapshots with `start <= timestamp <= end`, oldest first.
    pub fn in_window(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Snapshot> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if start > end {
            return Vec::new();
        }
        self.snapshots
            .range(start..=end)
            .map(|(_, s)| s.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.values()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Number of lookups served.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeMap;

    fn schema() -> Arc<DimensionSchema> {
        Arc::new(DimensionSchema::default_profile())
    }

    fn state(schema: &DimensionSchema, trust: f64) -> StateVector {
        let mut values = BTreeMap::new();
        values.insert("trust".to_string(), trust);
        schema.state_clamped(&values).unwrap()
    }

    #[test]
    fn nearest_prefers_latest_at_or_before() {
        let schema = schema();
        let mut store = SnapshotStore::new(schema.clone());
        let t0 = Utc::now();
        store
            .put(t0, state(&schema, 1.0), SnapshotReason::OnDemand, None)
            .unwrap();
        store
            .put(t0 + Duration::days(2), state(&schema, 2.0), SnapshotReason::OnDemand, None)
            .unwrap();

        let anchor = store.nearest_at_or_before(t0 + Duration::days(1));
        assert_eq!(anchor.timestamp(), Some(t0));
        let exact = store.nearest_at_or_before(t0 + Duration::days(2));
        assert_eq!(exact.state().get("trust"), Some(2.0));
        let before = store.nearest_at_or_before(t0 - Duration::seconds(1));
        assert!(!before.is_snapshot());
        assert_eq!(before.state(), &schema.baseline());
    }

    #[test]
    fn put_replaces_same_timestamp_and_validates() {
        let schema = schema();
        let mut store = SnapshotStore::new(schema.clone());
        let t = Utc::now();
        assert!(store
            .put(t, state(&schema, 1.0), SnapshotReason::OnDemand, None)
            .unwrap()
            .is_none());
        let replaced = store
            .put(t, state(&schema, 3.0), SnapshotReason::OnDemand, None)
            .unwrap();
        assert_eq!(replaced.map(|s| s.state.get("trust")), Some(Some(1.0)));
        assert_eq!(store.len(), 1);

        let partial = serde_json::from_str::<StateVector>(r#"{"trust": 4.0}"#).unwrap();
        assert!(store.put(t, partial, SnapshotReason::OnDemand, None).is_err());
    }

    #[test]
    fn nth_latest_counts_from_newest() {
        let schema = schema();
        let mut store = SnapshotStore::new(schema.clone());
        let t0 = Utc::now();
        for i in 0..3 {
            store
                .put(t0 + Duration::days(i), schema.baseline(), SnapshotReason::OnDemand, None)
                .unwrap();
        }
        assert_eq!(store.nth_latest(1).map(|s| s.timestamp), Some(t0 + Duration::days(2)));
        assert_eq!(store.nth_latest(3).map(|s| s.timestamp), Some(t0));
        assert!(store.nth_latest(4).is_none());
        assert!(store.nth_latest(0).is_none());
    }
}
