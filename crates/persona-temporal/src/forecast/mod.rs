//! Trend analysis and forward projection over sampled state histories.

pub mod classify;
pub mod projection;
pub mod trend;

pub use classify::{classify_trajectory, TrajectoryThresholds};
pub use projection::forecast_series;
pub use trend::{analyze, TrendAnalysis};
