//! Raw SQL operations, one module per table family.

pub mod event_ops;
pub mod meta_ops;
pub mod snapshot_ops;
