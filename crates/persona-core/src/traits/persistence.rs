//! ITimelinePersistence — host-side save/load hooks.

use crate::errors::PersonaResult;
use crate::models::{StateEvent, TimelineExport};

/// Persists a timeline between process lifetimes. The wire format belongs
/// to the implementation.
pub trait ITimelinePersistence: Send + Sync {
    /// Replace whatever was stored with `export`.
    fn save(&self, export: &TimelineExport) -> PersonaResult<()>;

    /// The last saved timeline, or `None` if nothing was saved yet.
    fn load(&self) -> PersonaResult<Option<TimelineExport>>;

    /// Keep events removed from the live log by compaction.
    fn archive(&self, events: &[StateEvent]) -> PersonaResult<u64>;
}
