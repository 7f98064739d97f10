//! v002: time index on the archive for range reads.

use rusqlite::Connection;

use persona_core::errors::PersonaResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> PersonaResult<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_timeline_archive_time
             ON timeline_events_archive(recorded_at);",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(())
}
