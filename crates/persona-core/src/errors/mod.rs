mod persona_error;
mod recovery;
mod storage_error;
mod temporal_error;
mod validation_error;

pub use persona_error::{PersonaError, PersonaResult};
pub use recovery::RecoveryAction;
pub use storage_error::StorageError;
pub use temporal_error::TemporalError;
pub use validation_error::ValidationError;
