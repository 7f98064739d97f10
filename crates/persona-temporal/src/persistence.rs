//! Export and import of a whole timeline.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use persona_core::config::PersonaConfig;
use persona_core::errors::{PersonaResult, TemporalError};
use persona_core::models::{TimelineExport, CURRENT_EXPORT_VERSION};
use persona_core::traits::ITimelinePersistence;

use crate::engine::TemporalEngine;
use crate::event_store::{CompactionResult, EventLog};
use crate::snapshot::SnapshotStore;
use crate::timeline::{GenerationClock, TimelineState};

impl TemporalEngine {
    /// Copy of the live timeline. Archived events are not included.
    pub fn serialize(&self) -> TimelineExport {
        let state = self.timeline.read();
        TimelineExport {
            schema_version: CURRENT_EXPORT_VERSION,
            dimensions: (*self.schema).clone(),
            events: state.log.iter().cloned().collect(),
            snapshots: state.snapshots.iter().cloned().collect(),
            compacted_through: state.log.compacted_through(),
            next_event_id: state.log.next_id(),
            exported_at: Utc::now(),
        }
    }

    /// Rebuild a store from an export. The export's dimensions must match
    /// the configured ones; every event and snapshot is re-validated.
    pub fn deserialize(config: PersonaConfig, export: TimelineExport) -> PersonaResult<Self> {
        config.validate()?;
        if export.schema_version != CURRENT_EXPORT_VERSION {
            return Err(TemporalError::SchemaVersionMismatch {
                expected: CURRENT_EXPORT_VERSION,
                found: export.schema_version,
            }
            .into());
        }
        let schema = Arc::new(config.schema()?);
        if export.dimensions != *schema {
            return Err(TemporalError::ImportRejected(
                "exported dimensions differ from the configured schema".to_string(),
            )
            .into());
        }

        let event_count = export.events.len();
        let log = EventLog::restore(
            Arc::clone(&schema),
            export.events,
            export.next_event_id,
            export.compacted_through,
        )?;

        let mut snapshots = SnapshotStore::new(Arc::clone(&schema));
        for snapshot in export.snapshots {
            let timestamp = snapshot.timestamp;
            let replaced =
                snapshots.put(timestamp, snapshot.state, snapshot.reason, snapshot.last_event_id)?;
            if replaced.is_some() {
                return Err(TemporalError::ImportRejected(format!(
                    "duplicate snapshot at {timestamp}"
                ))
                .into());
            }
        }

        info!(
            "imported timeline: {event_count} event(s), {} snapshot(s)",
            snapshots.len()
        );
        let state = TimelineState {
            log,
            snapshots,
            clock: GenerationClock::new(),
        };
        Ok(Self::from_parts(config, schema, state))
    }

    pub fn to_json(&self) -> PersonaResult<String> {
        Ok(serde_json::to_string(&self.serialize())?)
    }

    pub fn from_json(config: PersonaConfig, json: &str) -> PersonaResult<Self> {
        let export: TimelineExport = serde_json::from_str(json)?;
        Self::deserialize(config, export)
    }

    /// Save the live timeline through a host persistence hook.
    pub fn save_to(&self, store: &dyn ITimelinePersistence) -> PersonaResult<()> {
        store.save(&self.serialize())
    }

    /// Load a previously saved timeline, if any.
    pub fn load_from(
        config: PersonaConfig,
        store: &dyn ITimelinePersistence,
    ) -> PersonaResult<Option<Self>> {
        store
            .load()?
            .map(|export| Self::deserialize(config, export))
            .transpose()
    }

    /// Compact, then hand the archived events to `store`.
    pub fn compact_into(&self, store: &dyn ITimelinePersistence) -> PersonaResult<CompactionResult> {
        let result = self.compact()?;
        if !result.archived.is_empty() {
            store.archive(&result.archived)?;
        }
        Ok(result)
    }
}
