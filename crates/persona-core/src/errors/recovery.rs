//! RecoveryAction enum: what a host should do when an operation fails.

use std::fmt;

use super::{PersonaError, StorageError};

/// Recommended recovery action for a failed operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Retry the operation (cancellation, lock contention).
    Retry,
    /// Fall back to a degraded but functional alternative.
    Fallback,
    /// Escalate to the caller: this error cannot be handled silently.
    Escalate,
}

impl RecoveryAction {
    /// Determine the recommended recovery action for a PersonaError.
    pub fn for_error(error: &PersonaError) -> Self {
        match error {
            // Cancelled scans are side-effect free.
            PersonaError::Cancelled { .. } => Self::Retry,
            PersonaError::Storage(StorageError::DbBusy) => Self::Retry,

            // Not enough samples: show the reconstruction without a projection.
            PersonaError::InsufficientData { .. } => Self::Fallback,

            // Caller bugs or broken input: must be fixed upstream.
            PersonaError::Validation(_)
            | PersonaError::UnknownDimension { .. }
            | PersonaError::InvalidQuery(_)
            | PersonaError::Config(_)
            | PersonaError::Temporal(_)
            | PersonaError::Serialization(_)
            | PersonaError::Storage(_) => Self::Escalate,
        }
    }
}

impl fmt::Display for RecoveryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retry => write!(f, "Retry"),
            Self::Fallback => write!(f, "Fallback"),
            Self::Escalate => write!(f, "Escalate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    #[test]
    fn cancelled_is_retryable() {
        let err = PersonaError::cancelled("reconstruct");
        assert_eq!(RecoveryAction::for_error(&err), RecoveryAction::Retry);
    }

    #[test]
    fn validation_escalates() {
        let err = PersonaError::from(ValidationError::EmptyDelta);
        assert_eq!(RecoveryAction::for_error(&err), RecoveryAction::Escalate);
    }

    #[test]
    fn insufficient_data_falls_back() {
        let err = PersonaError::insufficient_data("trust", "no samples");
        assert_eq!(RecoveryAction::for_error(&err), RecoveryAction::Fallback);
        assert_eq!(RecoveryAction::Fallback.to_string(), "Fallback");
    }
}
