use super::{StorageError, TemporalError, ValidationError};

/// Top-level error type for the persona temporal store.
/// All subsystem errors convert into this via `From` impls.
///
/// Absence of history is not an error: reconstructing a timestamp with no
/// snapshot or no events yields a low-confidence result instead.
#[derive(Debug, thiserror::Error)]
pub enum PersonaError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("insufficient data for {dimension}: {reason}")]
    InsufficientData { dimension: String, reason: String },

    #[error("operation cancelled: {operation}")]
    Cancelled { operation: String },

    #[error("unknown dimension: {name}")]
    UnknownDimension { name: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PersonaError {
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Self::Cancelled {
            operation: operation.into(),
        }
    }

    pub fn insufficient_data(dimension: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            dimension: dimension.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias.
pub type PersonaResult<T> = Result<T, PersonaError>;
