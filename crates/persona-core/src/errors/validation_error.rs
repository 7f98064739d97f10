use chrono::{DateTime, Utc};

/// Structural problems detected before anything is written.
///
/// An append that fails validation leaves the log untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("delta targets unknown dimension '{name}'")]
    UnknownDimension { name: String },

    #[error("non-finite value for dimension '{dimension}'")]
    NonFinite { dimension: String },

    #[error("delta {delta} on '{dimension}' exceeds the dimension span {span}")]
    DeltaExceedsSpan {
        dimension: String,
        delta: f64,
        span: f64,
    },

    #[error("event delta is empty")]
    EmptyDelta,

    #[error("significance {value} outside 1..=10")]
    SignificanceOutOfRange { value: u8 },

    #[error("timestamp {timestamp} is older than the last appended event at {last}")]
    TimestampRegression {
        timestamp: DateTime<Utc>,
        last: DateTime<Utc>,
    },

    #[error("timestamp {timestamp} is not after the checkpoint at {checkpoint}")]
    PrecedesCheckpoint {
        timestamp: DateTime<Utc>,
        checkpoint: DateTime<Utc>,
    },

    #[error("value {value} for '{dimension}' outside [{lower}, {upper}]")]
    OutOfBounds {
        dimension: String,
        value: f64,
        lower: f64,
        upper: f64,
    },

    #[error("state is missing dimension '{name}'")]
    MissingDimension { name: String },

    #[error("invalid dimension schema: {0}")]
    InvalidSchema(String),
}
