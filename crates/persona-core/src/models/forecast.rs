//! Trend and forecast types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Shape of a dimension's recent history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrajectoryType {
    Ascending,
    Descending,
    Plateau,
    Oscillating,
    Breakthrough,
}

impl TrajectoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
            Self::Plateau => "plateau",
            Self::Oscillating => "oscillating",
            Self::Breakthrough => "breakthrough",
        }
    }
}

/// One observation of a single dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Where forecast samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sampling {
    /// Materialized snapshots inside the window.
    Snapshots,
    /// Core-depth reconstructions every `step`, starting at the window start.
    Every(Duration),
}

/// Inclusive time window for trend analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub sampling: Sampling,
}

impl SampleWindow {
    pub fn snapshots(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            sampling: Sampling::Snapshots,
        }
    }

    pub fn every(start: DateTime<Utc>, end: DateTime<Utc>, step: Duration) -> Self {
        Self {
            start,
            end,
            sampling: Sampling::Every(step),
        }
    }
}

/// Closed interval, already clamped to the dimension bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Projection for one dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub dimension: String,
    /// Clamped to the dimension bounds.
    pub projected_value: f64,
    /// `current + v·t + 0.5·a·t²` before clamping.
    pub raw_projection: f64,
    pub trajectory: TrajectoryType,
    pub confidence_interval: ConfidenceInterval,
    /// Units per time unit.
    pub velocity: f64,
    /// Units per time unit squared.
    pub acceleration: f64,
    pub sample_count: usize,
    pub horizon_units: f64,
    pub confidence: f64,
}
