/// Temporal subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum TemporalError {
    #[error("import rejected: {0}")]
    ImportRejected(String),

    #[error("checkpoint failed: {0}")]
    CheckpointFailed(String),

    #[error("compaction failed: {0}")]
    CompactionFailed(String),

    #[error("schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: u16, found: u16 },
}
