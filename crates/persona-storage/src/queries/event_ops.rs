//! Raw SQL operations for timeline_events and timeline_events_archive.

use rusqlite::{params, Connection};

use persona_core::errors::PersonaResult;
use persona_core::models::{EventId, EventKind, Significance, StateEvent};

use crate::codec::{time_from_sql, time_to_sql};
use crate::{corrupt, to_storage_err};

const EVENTS: &str = "timeline_events";
const ARCHIVE: &str = "timeline_events_archive";

/// Raw event row from the database.
#[derive(Debug, Clone)]
pub struct RawEvent {
    pub event_id: u64,
    pub recorded_at: String,
    pub kind: String,
    pub delta: String,
    pub significance: u8,
    pub note: Option<String>,
}

/// Insert one live event.
pub fn insert_event(conn: &Connection, event: &StateEvent) -> PersonaResult<()> {
    insert_into(conn, EVENTS, event, false).map(|_| ())
}

/// Copy events into the archive. Already-archived ids are skipped.
/// Returns the number of rows actually inserted.
pub fn archive_events(conn: &Connection, events: &[StateEvent]) -> PersonaResult<u64> {
    let mut inserted = 0;
    for event in events {
        inserted += insert_into(conn, ARCHIVE, event, true)?;
    }
    Ok(inserted)
}

fn insert_into(
    conn: &Connection,
    table: &str,
    event: &StateEvent,
    ignore_duplicates: bool,
) -> PersonaResult<u64> {
    let verb = if ignore_duplicates {
        "INSERT OR IGNORE"
    } else {
        "INSERT"
    };
    let delta = serde_json::to_string(&event.delta)?;
    let changed = conn
        .execute(
            &format!(
                "{verb} INTO {table} (event_id, recorded_at, kind, delta, significance, note)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
            ),
            params![
                event.id.0 as i64,
                time_to_sql(event.timestamp),
                event.kind.as_str(),
                delta,
                event.significance.value(),
                event.note,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(changed as u64)
}

/// All live events in log order.
pub fn get_events(conn: &Connection) -> PersonaResult<Vec<StateEvent>> {
    select_all(conn, EVENTS)
}

/// All archived events in log order.
pub fn get_archived_events(conn: &Connection) -> PersonaResult<Vec<StateEvent>> {
    select_all(conn, ARCHIVE)
}

/// Archived events in `(after, through]`.
pub fn get_archived_between(
    conn: &Connection,
    after: &str,
    through: &str,
) -> PersonaResult<Vec<StateEvent>> {
    let mut stmt = conn
        .prepare(
            "SELECT event_id, recorded_at, kind, delta, significance, note
             FROM timeline_events_archive
             WHERE recorded_at > ?1 AND recorded_at <= ?2
             ORDER BY recorded_at ASC, event_id ASC",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![after, through], row_to_raw_event)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let raw = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.into_iter().map(|r| raw_to_event(ARCHIVE, r)).collect()
}

pub fn count_archived(conn: &Connection) -> PersonaResult<u64> {
    conn.query_row("SELECT COUNT(*) FROM timeline_events_archive", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as u64)
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Drop every live event. Used before a full save.
pub fn clear_events(conn: &Connection) -> PersonaResult<u64> {
    let deleted = conn
        .execute("DELETE FROM timeline_events", [])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(deleted as u64)
}

fn select_all(conn: &Connection, table: &str) -> PersonaResult<Vec<StateEvent>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT event_id, recorded_at, kind, delta, significance, note
             FROM {table} ORDER BY event_id ASC"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map([], row_to_raw_event)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let raw = rows
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.into_iter().map(|r| raw_to_event(table, r)).collect()
}

fn row_to_raw_event(row: &rusqlite::Row<'_>) -> Result<RawEvent, rusqlite::Error> {
    Ok(RawEvent {
        event_id: row.get::<_, i64>(0)? as u64,
        recorded_at: row.get(1)?,
        kind: row.get(2)?,
        delta: row.get(3)?,
        significance: row.get(4)?,
        note: row.get(5)?,
    })
}

fn raw_to_event(table: &str, raw: RawEvent) -> PersonaResult<StateEvent> {
    let kind = EventKind::parse(&raw.kind).ok_or_else(|| {
        corrupt(
            table,
            format!("event {}: unknown kind '{}'", raw.event_id, raw.kind),
        )
    })?;
    let delta = serde_json::from_str(&raw.delta)
        .map_err(|e| corrupt(table, format!("event {}: delta: {e}", raw.event_id)))?;
    let significance = Significance::new(raw.significance)
        .map_err(|e| corrupt(table, format!("event {}: {e}", raw.event_id)))?;
    Ok(StateEvent {
        id: EventId(raw.event_id),
        timestamp: time_from_sql(table, &raw.recorded_at)?,
        kind,
        delta,
        significance,
        note: raw.note,
    })
}
