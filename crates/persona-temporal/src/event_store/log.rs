//! The append-only event log.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use persona_core::errors::ValidationError;
use persona_core::models::{DimensionSchema, EventId, NewEvent, Significance, StateEvent};

/// Timestamp-ordered, append-only log of state deltas.
///
/// Appends are validated structurally and are all-or-nothing. Events with
/// equal timestamps keep their append order, which replay treats as
/// authoritative.
#[derive(Debug)]
pub struct EventLog {
    schema: Arc<DimensionSchema>,
    events: Vec<StateEvent>,
    next_id: u64,
    compacted_through: Option<DateTime<Utc>>,
    reads: AtomicU64,
}

impl EventLog {
    pub fn new(schema: Arc<DimensionSchema>) -> Self {
        Self {
            schema,
            events: Vec::new(),
            next_id: 1,
            compacted_through: None,
            reads: AtomicU64::new(0),
        }
    }

    /// Append with no checkpoint constraint.
    pub fn append(&mut self, event: NewEvent) -> Result<EventId, ValidationError> {
        self.append_after(event, None)
    }

    /// Append an event that must land strictly after `checkpoint` (the latest
    /// snapshot), since replay starts after a snapshot's own instant.
    pub fn append_after(
        &mut self,
        event: NewEvent,
        checkpoint: Option<DateTime<Utc>>,
    ) -> Result<EventId, ValidationError> {
        let significance = self.validate(&event, self.last_timestamp(), checkpoint)?;
        Ok(self.push(event, significance))
    }

    /// Append several events atomically: either all are appended or none.
    pub fn append_batch(
        &mut self,
        events: Vec<NewEvent>,
        checkpoint: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventId>, ValidationError> {
        let mut last = self.last_timestamp();
        let mut validated = Vec::with_capacity(events.len());
        for event in events {
            let significance = self.validate(&event, last, checkpoint)?;
            last = Some(event.timestamp);
            validated.push((event, significance));
        }
        Ok(validated
            .into_iter()
            .map(|(event, significance)| self.push(event, significance))
            .collect())
    }

    fn validate(
        &self,
        event: &NewEvent,
        last: Option<DateTime<Utc>>,
        checkpoint: Option<DateTime<Utc>>,
    ) -> Result<Significance, ValidationError> {
        self.schema.validate_delta(&event.delta)?;
        let significance = Significance::new(event.significance)?;
        if let Some(last) = last {
            if event.timestamp < last {
                return Err(ValidationError::TimestampRegression {
                    timestamp: event.timestamp,
                    last,
                });
            }
        }
        if let Some(checkpoint) = checkpoint {
            if event.timestamp <= checkpoint {
                return Err(ValidationError::PrecedesCheckpoint {
                    timestamp: event.timestamp,
                    checkpoint,
                });
            }
        }
        Ok(significance)
    }

    fn push(&mut self, event: NewEvent, significance: Significance) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        self.events.push(StateEvent {
            id,
            timestamp: event.timestamp,
            kind: event.kind,
            delta: event.delta,
            significance,
            note: event.note,
        });
        id
    }

    /// Events in `(after, through]`, in log order. `after = None` is unbounded.
    pub fn range(&self, after: Option<DateTime<Utc>>, through: DateTime<Utc>) -> &[StateEvent] {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let start = match after {
            Some(after) => self.events.partition_point(|e| e.timestamp <= after),
            None => 0,
        };
        let end = self.events.partition_point(|e| e.timestamp <= through);
        if start >= end {
            &[]
        } else {
            &self.events[start..end]
        }
    }

    /// Every event strictly after `after`, without counting as a query read.
    pub fn since(&self, after: Option<DateTime<Utc>>) -> &[StateEvent] {
        let start = match after {
            Some(after) => self.events.partition_point(|e| e.timestamp <= after),
            None => 0,
        };
        &self.events[start..]
    }

    /// Remove and return every event at or before `through`.
    pub fn archive_through(&mut self, through: DateTime<Utc>) -> Vec<StateEvent> {
        let end = self.events.partition_point(|e| e.timestamp <= through);
        let archived: Vec<StateEvent> = self.events.drain(..end).collect();
        if !archived.is_empty() || self.compacted_through.is_none() {
            self.compacted_through = Some(match self.compacted_through {
                Some(prev) => prev.max(through),
                None => through,
            });
        }
        archived
    }

    /// Rebuild from persisted events. Ordering and deltas are re-validated.
    pub fn restore(
        schema: Arc<DimensionSchema>,
        events: Vec<StateEvent>,
        next_id: u64,
        compacted_through: Option<DateTime<Utc>>,
    ) -> Result<Self, ValidationError> {
        let mut last: Option<&StateEvent> = None;
        for event in &events {
            schema.validate_delta(&event.delta)?;
            if let Some(prev) = last {
                if event.timestamp < prev.timestamp {
                    return Err(ValidationError::TimestampRegression {
                        timestamp: event.timestamp,
                        last: prev.timestamp,
                    });
                }
                if event.id <= prev.id {
                    return Err(ValidationError::InvalidSchema(format!(
                        "event ids not increasing: {} after {}",
                        event.id, prev.id
                    )));
                }
            }
            last = Some(event);
        }
        let max_id = events.last().map_or(0, |e| e.id.0);
        Ok(Self {
            schema,
            events,
            next_id: next_id.max(max_id + 1),
            compacted_through,
            reads: AtomicU64::new(0),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.events.last().map(|e| e.timestamp)
    }

    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn compacted_through(&self) -> Option<DateTime<Utc>> {
        self.compacted_through
    }

    /// Number of `range` queries served.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use persona_core::models::{EventKind, StateDelta};

    fn log() -> EventLog {
        EventLog::new(Arc::new(DimensionSchema::default_profile()))
    }

    fn event(t: DateTime<Utc>, trust: f64) -> NewEvent {
        NewEvent::new(t, EventKind::Interaction, StateDelta::new().with("trust", trust))
    }

    #[test]
    fn ids_increase_and_ties_keep_append_order() {
        let mut log = log();
        let t = Utc::now();
        let a = log.append(event(t, 1.0)).unwrap();
        let b = log.append(event(t, -1.0)).unwrap();
        assert!(b > a);
        let range = log.range(None, t);
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].id, a);
        assert_eq!(range[1].id, b);
    }

    #[test]
    fn range_is_half_open() {
        let mut log = log();
        let t0 = Utc::now();
        for i in 0..5 {
            log.append(event(t0 + Duration::hours(i), 0.1)).unwrap();
        }
        let slice = log.range(Some(t0 + Duration::hours(1)), t0 + Duration::hours(3));
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].timestamp, t0 + Duration::hours(2));
        assert_eq!(slice[1].timestamp, t0 + Duration::hours(3));
        assert!(log.range(Some(t0 + Duration::hours(3)), t0).is_empty());
        assert_eq!(log.reads(), 2);
    }

    #[test]
    fn regression_and_checkpoint_are_rejected() {
        let mut log = log();
        let t = Utc::now();
        log.append(event(t, 1.0)).unwrap();
        assert!(matches!(
            log.append(event(t - Duration::seconds(1), 1.0)),
            Err(ValidationError::TimestampRegression { .. })
        ));
        assert!(matches!(
            log.append_after(event(t, 1.0), Some(t)),
            Err(ValidationError::PrecedesCheckpoint { .. })
        ));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn batch_is_all_or_nothing() {
        let mut log = log();
        let t = Utc::now();
        let batch = vec![
            event(t, 1.0),
            event(t + Duration::seconds(1), 1.0),
            event(t + Duration::seconds(2), 100.0),
        ];
        assert!(log.append_batch(batch, None).is_err());
        assert!(log.is_empty());
        assert_eq!(log.next_id(), 1);
    }

    #[test]
    fn archive_moves_prefix() {
        let mut log = log();
        let t0 = Utc::now();
        for i in 0..4 {
            log.append(event(t0 + Duration::days(i), 0.5)).unwrap();
        }
        let archived = log.archive_through(t0 + Duration::days(1));
        assert_eq!(archived.len(), 2);
        assert_eq!(log.len(), 2);
        assert_eq!(log.compacted_through(), Some(t0 + Duration::days(1)));
        // ids keep counting after compaction
        let id = log.append(event(t0 + Duration::days(5), 0.5)).unwrap();
        assert_eq!(id, EventId(5));
    }
}
