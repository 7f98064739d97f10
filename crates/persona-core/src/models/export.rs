//! Interchange record for the persistence collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{DimensionSchema, Snapshot, StateEvent};

/// Current [`TimelineExport`] format version.
pub const CURRENT_EXPORT_VERSION: u16 = 1;

/// Everything needed to rebuild a store in another process.
///
/// The wire format is up to the host; the store only guarantees that
/// `deserialize(serialize())` reproduces every reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineExport {
    pub schema_version: u16,
    pub dimensions: DimensionSchema,
    pub events: Vec<StateEvent>,
    pub snapshots: Vec<Snapshot>,
    /// Events at or before this instant were archived by compaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compacted_through: Option<DateTime<Utc>>,
    /// Next id the log will assign.
    pub next_event_id: u64,
    pub exported_at: DateTime<Utc>,
}
