//! Two-state comparison results.

use serde::{Deserialize, Serialize};

use super::TrajectoryType;

/// Sign of a per-dimension change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increased,
    Decreased,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionDelta {
    pub dimension: String,
    pub from: f64,
    pub to: f64,
    /// `to - from`.
    pub delta: f64,
    pub direction: Direction,
    pub trajectory: TrajectoryType,
}

/// How state B differs from state A.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    pub per_dimension: Vec<DimensionDelta>,
    /// Mean absolute per-dimension delta.
    pub aggregate_magnitude: f64,
    pub mean_signed_delta: f64,
    /// Dimension with the largest absolute delta, if anything moved.
    pub dominant_dimension: Option<String>,
    pub trajectory: TrajectoryType,
}

impl Divergence {
    pub fn delta_for(&self, dimension: &str) -> Option<&DimensionDelta> {
        self.per_dimension.iter().find(|d| d.dimension == dimension)
    }
}
