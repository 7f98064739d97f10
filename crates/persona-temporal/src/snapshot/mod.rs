//! Snapshot subsystem: storage, nearest lookup, checkpoint folding,
//! adaptive triggers, integrity checks.

pub mod checkpoint;
pub mod integrity;
pub mod store;
pub mod triggers;

pub use integrity::{IntegrityReport, IntegrityViolation};
pub use store::{Anchor, SnapshotStore};
pub use triggers::AdaptiveSnapshotTrigger;
