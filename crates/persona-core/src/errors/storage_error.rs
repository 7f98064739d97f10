//! Storage-layer errors for the persistence collaborator.

/// Errors that can occur while persisting or loading a timeline.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Database busy (another operation in progress)")]
    DbBusy,

    #[error("Compression failed: {message}")]
    Compression { message: String },

    #[error("Corrupt payload in {table}: {details}")]
    Corrupt { table: String, details: String },
}
