//! Materialized full-state checkpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, StateVector};

/// Full state at a checkpoint timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub state: StateVector,
    pub reason: SnapshotReason,
    /// Last event folded into this snapshot, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event_id: Option<EventId>,
}

/// Why a snapshot was created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotReason {
    /// Too many events since the previous checkpoint.
    EventThreshold,
    /// A high-significance event landed since the previous checkpoint.
    SignificantEvent,
    /// Written by compaction before archiving old events.
    Compaction,
    /// Explicitly captured by a caller.
    OnDemand,
    /// Loaded from a persisted timeline.
    Imported,
}

impl SnapshotReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventThreshold => "event_threshold",
            Self::SignificantEvent => "significant_event",
            Self::Compaction => "compaction",
            Self::OnDemand => "on_demand",
            Self::Imported => "imported",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "event_threshold" => Some(Self::EventThreshold),
            "significant_event" => Some(Self::SignificantEvent),
            "compaction" => Some(Self::Compaction),
            "on_demand" => Some(Self::OnDemand),
            "imported" => Some(Self::Imported),
            _ => None,
        }
    }
}
