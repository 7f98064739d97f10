//! # persona-temporal
//!
//! Event-sourced state for a single subject: an append-only event log,
//! periodic snapshots, point-in-time reconstruction with a generation-tagged
//! cache, trend forecasting, and divergence analysis.

pub mod cache;
pub mod cancellation;
pub mod divergence;
pub mod engine;
pub mod event_store;
pub mod forecast;
pub mod persistence;
pub mod reconstruct;
pub mod signal;
pub mod snapshot;
pub mod timeline;

pub use cancellation::Cancellation;
pub use engine::{EngineStats, MaintenanceReport, TemporalEngine};
pub use event_store::CompactionResult;
pub use signal::{ExtractionStrategy, KeywordRule, KeywordSignalExtractor};
pub use snapshot::{IntegrityReport, IntegrityViolation};
