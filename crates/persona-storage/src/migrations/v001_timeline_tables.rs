//! v001: live events, archive, snapshots, timeline metadata.

use rusqlite::Connection;

use persona_core::errors::PersonaResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> PersonaResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS timeline_meta (
            id                INTEGER PRIMARY KEY CHECK (id = 1),
            export_version    INTEGER NOT NULL,
            dimensions        TEXT NOT NULL,
            next_event_id     INTEGER NOT NULL,
            compacted_through TEXT,
            saved_at          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS timeline_events (
            event_id     INTEGER PRIMARY KEY,
            recorded_at  TEXT NOT NULL,
            kind         TEXT NOT NULL,
            delta        TEXT NOT NULL,
            significance INTEGER NOT NULL CHECK (significance BETWEEN 1 AND 10),
            note         TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_timeline_events_time
            ON timeline_events(recorded_at);

        CREATE TABLE IF NOT EXISTS timeline_events_archive (
            event_id     INTEGER PRIMARY KEY,
            recorded_at  TEXT NOT NULL,
            kind         TEXT NOT NULL,
            delta        TEXT NOT NULL,
            significance INTEGER NOT NULL,
            note         TEXT,
            archived_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE TABLE IF NOT EXISTS timeline_snapshots (
            snapshot_at   TEXT PRIMARY KEY,
            state         BLOB NOT NULL,
            reason        TEXT NOT NULL,
            last_event_id INTEGER
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(())
}
