//! Replay-invariant verification between consecutive snapshots.

use chrono::{DateTime, Utc};

use persona_core::models::DimensionSchema;

use super::store::SnapshotStore;
use crate::event_store::{replay, EventLog};

/// A snapshot that disagrees with replaying its predecessor.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityViolation {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub dimension: String,
    pub expected: f64,
    pub actual: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    pub pairs_checked: usize,
    /// Pairs whose events were compacted away and could not be checked.
    pub pairs_skipped: usize,
    pub violations: Vec<IntegrityViolation>,
}

impl IntegrityReport {
    pub fn is_consistent(&self) -> bool {
        self.violations.is_empty()
    }
}

/// For consecutive snapshots S1 < S2, replaying `(S1, S2]` onto S1 must
/// reproduce S2 within `tolerance` on every dimension.
pub fn verify_replay_invariant(
    schema: &DimensionSchema,
    log: &EventLog,
    snapshots: &SnapshotStore,
    tolerance: f64,
) -> IntegrityReport {
    let mut report = IntegrityReport::default();
    let ordered: Vec<_> = snapshots.iter().collect();

    for pair in ordered.windows(2) {
        let (earlier, later) = (pair[0], pair[1]);
        if log
            .compacted_through()
            .is_some_and(|through| earlier.timestamp < through)
        {
            report.pairs_skipped += 1;
            continue;
        }

        let events = log.since(Some(earlier.timestamp));
        let end = events.partition_point(|e| e.timestamp <= later.timestamp);
        let replayed = replay::replay_events(schema, &events[..end], earlier.state.clone());
        report.pairs_checked += 1;

        for spec in schema.specs() {
            let expected = replayed.get(&spec.name).unwrap_or(spec.baseline);
            let actual = later.state.get(&spec.name).unwrap_or(spec.baseline);
            if (expected - actual).abs() > tolerance {
                report.violations.push(IntegrityViolation {
                    from: earlier.timestamp,
                    to: later.timestamp,
                    dimension: spec.name.clone(),
                    expected,
                    actual,
                });
            }
        }
    }

    if !report.is_consistent() {
        tracing::warn!(
            violations = report.violations.len(),
            pairs_checked = report.pairs_checked,
            "snapshot replay invariant violated"
        );
    }
    report
}
