//! Raw SQL operations for the timeline_snapshots table.

use rusqlite::{params, Connection};

use persona_core::errors::PersonaResult;
use persona_core::models::{EventId, Snapshot, SnapshotReason};

use crate::codec::{compress_state, decompress_state, time_from_sql, time_to_sql};
use crate::{corrupt, to_storage_err};

const TABLE: &str = "timeline_snapshots";

/// Raw snapshot row from the database.
#[derive(Debug, Clone)]
pub struct RawSnapshot {
    pub snapshot_at: String,
    pub state: Vec<u8>,
    pub reason: String,
    pub last_event_id: Option<u64>,
}

/// Insert a snapshot with its state compressed.
pub fn insert_snapshot(conn: &Connection, snapshot: &Snapshot) -> PersonaResult<()> {
    let state = compress_state(&snapshot.state)?;
    conn.execute(
        "INSERT INTO timeline_snapshots (snapshot_at, state, reason, last_event_id)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            time_to_sql(snapshot.timestamp),
            state,
            snapshot.reason.as_str(),
            snapshot.last_event_id.map(|id| id.0 as i64),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// All snapshots, oldest first.
pub fn get_snapshots(conn: &Connection) -> PersonaResult<Vec<Snapshot>> {
    let mut stmt = conn
        .prepare(
            "SELECT snapshot_at, state, reason, last_event_id
             FROM timeline_snapshots ORDER BY snapshot_at ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map([], row_to_raw_snapshot)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let raw = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.into_iter().map(raw_to_snapshot).collect()
}

pub fn clear_snapshots(conn: &Connection) -> PersonaResult<u64> {
    let deleted = conn
        .execute("DELETE FROM timeline_snapshots", [])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(deleted as u64)
}

fn row_to_raw_snapshot(row: &rusqlite::Row<'_>) -> Result<RawSnapshot, rusqlite::Error> {
    Ok(RawSnapshot {
        snapshot_at: row.get(0)?,
        state: row.get(1)?,
        reason: row.get(2)?,
        last_event_id: row.get::<_, Option<i64>>(3)?.map(|id| id as u64),
    })
}

fn raw_to_snapshot(raw: RawSnapshot) -> PersonaResult<Snapshot> {
    let reason = SnapshotReason::parse(&raw.reason)
        .ok_or_else(|| corrupt(TABLE, format!("unknown reason '{}'", raw.reason)))?;
    Ok(Snapshot {
        timestamp: time_from_sql(TABLE, &raw.snapshot_at)?,
        state: decompress_state(&raw.state)?,
        reason,
        last_event_id: raw.last_event_id.map(EventId),
    })
}
