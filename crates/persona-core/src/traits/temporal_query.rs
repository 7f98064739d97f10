//! ITemporalQuery — the public query surface of a persona store.

use chrono::{DateTime, Duration, Utc};

use crate::errors::PersonaResult;
use crate::models::{
    Depth, Divergence, Forecast, ReconstructionContext, ReconstructionResult, SampleWindow,
};

/// Point-in-time, forecast, and comparison queries.
///
/// All three are synchronous, CPU-bound reads. Hosts that want async
/// scheduling wrap them at the boundary.
pub trait ITemporalQuery: Send + Sync {
    /// State at `target`. Never fails for missing history: an empty or
    /// young timeline yields a low-confidence `extrapolated-backward` result.
    fn reconstruct(
        &self,
        target: DateTime<Utc>,
        depth: Depth,
        context: Option<&ReconstructionContext>,
    ) -> PersonaResult<ReconstructionResult>;

    /// Project `dimension` `horizon` past the last sample in `window`.
    fn forecast(
        &self,
        dimension: &str,
        window: &SampleWindow,
        horizon: Duration,
    ) -> PersonaResult<Forecast>;

    /// Core-depth reconstructions at both instants, compared.
    fn compare(&self, a: DateTime<Utc>, b: DateTime<Utc>) -> PersonaResult<Divergence>;
}
