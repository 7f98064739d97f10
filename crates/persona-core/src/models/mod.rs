mod dimension;
mod divergence;
mod event;
mod export;
mod forecast;
mod reconstruction;
mod snapshot;
mod state_vector;

pub use dimension::{DimensionSchema, DimensionSpec};
pub(crate) use dimension::default_dimensions;
pub use divergence::{DimensionDelta, Direction, Divergence};
pub use event::{EventId, EventKind, NewEvent, Significance, StateEvent};
pub use export::{TimelineExport, CURRENT_EXPORT_VERSION};
pub use forecast::{ConfidenceInterval, Forecast, Sample, SampleWindow, Sampling, TrajectoryType};
pub use reconstruction::{
    Basis, ContextFingerprint, Depth, InteractionRecord, ReconstructionContext,
    ReconstructionResult,
};
pub use snapshot::{Snapshot, SnapshotReason};
pub use state_vector::{StateDelta, StateVector};
