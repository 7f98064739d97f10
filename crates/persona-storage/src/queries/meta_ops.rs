//! Raw SQL operations for the single-row timeline_meta table.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use persona_core::errors::PersonaResult;
use persona_core::models::DimensionSchema;

use crate::codec::{time_from_sql, time_to_sql};
use crate::{corrupt, to_storage_err};

const TABLE: &str = "timeline_meta";

/// Decoded timeline header.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineMeta {
    pub export_version: u16,
    pub dimensions: DimensionSchema,
    pub next_event_id: u64,
    pub compacted_through: Option<DateTime<Utc>>,
    pub saved_at: DateTime<Utc>,
}

pub fn upsert_meta(conn: &Connection, meta: &TimelineMeta) -> PersonaResult<()> {
    let dimensions = serde_json::to_string(&meta.dimensions)?;
    conn.execute(
        "INSERT INTO timeline_meta
            (id, export_version, dimensions, next_event_id, compacted_through, saved_at)
         VALUES (1, ?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            export_version = excluded.export_version,
            dimensions = excluded.dimensions,
            next_event_id = excluded.next_event_id,
            compacted_through = excluded.compacted_through,
            saved_at = excluded.saved_at",
        params![
            meta.export_version,
            dimensions,
            meta.next_event_id as i64,
            meta.compacted_through.map(time_to_sql),
            time_to_sql(meta.saved_at),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// The stored header, or `None` if nothing was ever saved.
pub fn get_meta(conn: &Connection) -> PersonaResult<Option<TimelineMeta>> {
    let raw = conn
        .query_row(
            "SELECT export_version, dimensions, next_event_id, compacted_through, saved_at
             FROM timeline_meta WHERE id = 1",
            [],
            |row| {
                Ok((
                    row.get::<_, u16>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, String>(4)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let Some((export_version, dimensions, next_event_id, compacted_through, saved_at)) = raw else {
        return Ok(None);
    };

    let dimensions: DimensionSchema = serde_json::from_str(&dimensions)
        .map_err(|e| corrupt(TABLE, format!("dimensions: {e}")))?;
    let compacted_through = compacted_through
        .map(|raw| time_from_sql(TABLE, &raw))
        .transpose()?;

    Ok(Some(TimelineMeta {
        export_version,
        dimensions,
        next_event_id: next_event_id as u64,
        compacted_through,
        saved_at: time_from_sql(TABLE, &saved_at)?,
    }))
}
