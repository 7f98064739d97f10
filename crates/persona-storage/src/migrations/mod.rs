//! Migration runner — version tracking, forward-only, transactional per migration.

mod v001_timeline_tables;
mod v002_archive_index;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use persona_core::errors::{PersonaResult, StorageError};
use persona_core::PersonaError;

use crate::to_storage_err;

/// Total number of migrations.
pub const LATEST_VERSION: u32 = 2;

type MigrationFn = fn(&Connection) -> PersonaResult<()>;

const MIGRATIONS: [(u32, &str, MigrationFn); 2] = [
    (1, "timeline_tables", v001_timeline_tables::migrate),
    (2, "archive_index", v002_archive_index::migrate),
];

/// Current schema version, or 0 for a fresh database.
pub fn current_version(conn: &Connection) -> PersonaResult<u32> {
    let exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version'")
        .and_then(|mut stmt| stmt.exists([]))
        .map_err(|e| to_storage_err(e.to_string()))?;

    if !exists {
        return Ok(0);
    }

    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

/// Run all pending migrations. Returns how many were applied.
pub fn run_migrations(conn: &Connection) -> PersonaResult<u32> {
    let current = current_version(conn)?;
    if current >= LATEST_VERSION {
        debug!("timeline schema is up to date (v{current})");
        return Ok(0);
    }

    info!("running migrations: v{} → v{}", current, LATEST_VERSION);

    let mut applied = 0;
    for &(version, name, migrate_fn) in &MIGRATIONS {
        if version <= current {
            continue;
        }

        debug!("applying migration v{version:03}: {name}");
        conn.execute_batch("BEGIN IMMEDIATE")
            .map_err(|e| to_storage_err(format!("begin transaction for v{version:03}: {e}")))?;

        let outcome = migrate_fn(conn).and_then(|()| {
            conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])
                .map(|_| ())
                .map_err(|e| to_storage_err(format!("record version v{version:03}: {e}")))
        });

        match outcome {
            Ok(()) => {
                conn.execute_batch("COMMIT")
                    .map_err(|e| to_storage_err(format!("commit v{version:03}: {e}")))?;
                info!("applied migration v{version:03}: {name}");
                applied += 1;
            }
            Err(e) => {
                warn!("migration v{version:03} failed: {e}, rolling back");
                let _ = conn.execute_batch("ROLLBACK");
                return Err(PersonaError::Storage(StorageError::MigrationFailed {
                    version,
                    message: e.to_string(),
                }));
            }
        }
    }

    info!("applied {applied} migration(s), now at v{LATEST_VERSION}");
    Ok(applied)
}
