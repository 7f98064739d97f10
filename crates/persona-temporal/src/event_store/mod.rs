//! Event store: append-only, timestamp-ordered log with replay.

pub mod compaction;
pub mod log;
pub mod replay;

pub use compaction::CompactionResult;
pub use log::EventLog;
