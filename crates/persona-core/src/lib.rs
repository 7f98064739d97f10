//! # persona-core
//!
//! Foundation crate for the persona temporal store.
//! Defines the state model, events, snapshots, query/result types, traits,
//! errors, and config shared by the engine and the persistence layer.

pub mod config;
pub mod errors;
pub mod models;
pub mod telemetry;
pub mod traits;

pub use config::PersonaConfig;
pub use errors::{PersonaError, PersonaResult};
