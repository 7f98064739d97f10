//! # persona-storage
//!
//! SQLite persistence for persona timelines.
//! Implements `ITimelinePersistence` on top of a single write connection:
//! live events, zstd-compressed snapshots, the compaction archive, and
//! forward-only migrations.

pub mod codec;
pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

/// Helper to convert a string message into a PersonaError::Storage.
pub fn to_storage_err(msg: String) -> persona_core::PersonaError {
    persona_core::PersonaError::Storage(persona_core::errors::StorageError::SqliteError {
        message: msg,
    })
}

/// Like [`to_storage_err`], but lock contention maps to `DbBusy` so hosts
/// can retry.
pub fn from_sqlite(e: rusqlite::Error) -> persona_core::PersonaError {
    match e.sqlite_error_code() {
        Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
            persona_core::PersonaError::Storage(persona_core::errors::StorageError::DbBusy)
        }
        _ => to_storage_err(e.to_string()),
    }
}

/// A row that decoded into something the store cannot accept.
pub(crate) fn corrupt(table: &str, details: impl Into<String>) -> persona_core::PersonaError {
    persona_core::PersonaError::Storage(persona_core::errors::StorageError::Corrupt {
        table: table.to_string(),
        details: details.into(),
    })
}
