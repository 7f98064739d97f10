//! StorageEngine — SQLite-backed `ITimelinePersistence`.
//!
//! A save replaces the live tables wholesale inside one transaction; the
//! archive only ever grows.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use tracing::{debug, info};

use persona_core::errors::PersonaResult;
use persona_core::models::{StateEvent, TimelineExport};
use persona_core::traits::ITimelinePersistence;

use crate::codec::time_to_sql;
use crate::migrations;
use crate::pool::{in_transaction, WriteConnection};
use crate::queries::meta_ops::{self, TimelineMeta};
use crate::queries::{event_ops, snapshot_ops};

/// Persistent home for one subject's timeline.
pub struct StorageEngine {
    writer: Arc<WriteConnection>,
}

impl StorageEngine {
    /// Open a file-backed store. Runs migrations and applies pragmas.
    pub fn open(path: &Path) -> PersonaResult<Self> {
        Ok(Self {
            writer: Arc::new(WriteConnection::open(path)?),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> PersonaResult<Self> {
        Ok(Self {
            writer: Arc::new(WriteConnection::open_in_memory()?),
        })
    }

    pub fn writer(&self) -> &Arc<WriteConnection> {
        &self.writer
    }

    pub async fn save_timeline(&self, export: &TimelineExport) -> PersonaResult<()> {
        self.writer.with_conn(|conn| save_in(conn, export)).await
    }

    pub async fn load_timeline(&self) -> PersonaResult<Option<TimelineExport>> {
        self.writer.with_conn(load_in).await
    }

    pub async fn archive_events(&self, events: &[StateEvent]) -> PersonaResult<u64> {
        self.writer.with_conn(|conn| archive_in(conn, events)).await
    }

    /// Archived events in `(after, through]`, in log order.
    pub async fn archived_between(
        &self,
        after: DateTime<Utc>,
        through: DateTime<Utc>,
    ) -> PersonaResult<Vec<StateEvent>> {
        let (after, through) = (time_to_sql(after), time_to_sql(through));
        self.writer
            .with_conn(|conn| event_ops::get_archived_between(conn, &after, &through))
            .await
    }

    pub fn archived_count(&self) -> PersonaResult<u64> {
        self.writer.with_conn_sync(event_ops::count_archived)
    }

    pub fn schema_version(&self) -> PersonaResult<u32> {
        self.writer.with_conn_sync(migrations::current_version)
    }
}

impl ITimelinePersistence for StorageEngine {
    fn save(&self, export: &TimelineExport) -> PersonaResult<()> {
        self.writer.with_conn_sync(|conn| save_in(conn, export))
    }

    fn load(&self) -> PersonaResult<Option<TimelineExport>> {
        self.writer.with_conn_sync(load_in)
    }

    fn archive(&self, events: &[StateEvent]) -> PersonaResult<u64> {
        self.writer.with_conn_sync(|conn| archive_in(conn, events))
    }
}

fn save_in(conn: &Connection, export: &TimelineExport) -> PersonaResult<()> {
    in_transaction(conn, |conn| {
        event_ops::clear_events(conn)?;
        snapshot_ops::clear_snapshots(conn)?;
        for event in &export.events {
            event_ops::insert_event(conn, event)?;
        }
        for snapshot in &export.snapshots {
            snapshot_ops::insert_snapshot(conn, snapshot)?;
        }
        meta_ops::upsert_meta(
            conn,
            &TimelineMeta {
                export_version: export.schema_version,
                dimensions: export.dimensions.clone(),
                next_event_id: export.next_event_id,
                compacted_through: export.compacted_through,
                saved_at: export.exported_at,
            },
        )
    })?;
    info!(
        "saved timeline: {} events, {} snapshots",
        export.events.len(),
        export.snapshots.len()
    );
    Ok(())
}

fn load_in(conn: &Connection) -> PersonaResult<Option<TimelineExport>> {
    let Some(meta) = meta_ops::get_meta(conn)? else {
        debug!("no saved timeline");
        return Ok(None);
    };
    let events = event_ops::get_events(conn)?;
    let snapshots = snapshot_ops::get_snapshots(conn)?;
    debug!(
        "loaded timeline: {} events, {} snapshots",
        events.len(),
        snapshots.len()
    );
    Ok(Some(TimelineExport {
        schema_version: meta.export_version,
        dimensions: meta.dimensions,
        events,
        snapshots,
        compacted_through: meta.compacted_through,
        next_event_id: meta.next_event_id,
        exported_at: meta.saved_at,
    }))
}

fn archive_in(conn: &Connection, events: &[StateEvent]) -> PersonaResult<u64> {
    let inserted = in_transaction(conn, |conn| event_ops::archive_events(conn, events))?;
    debug!("archived {inserted} of {} events", events.len());
    Ok(inserted)
}
