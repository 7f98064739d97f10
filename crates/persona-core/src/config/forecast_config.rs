//! Trend classification thresholds and forecast sampling limits.

use serde::{Deserialize, Serialize};

/// Which dispersion figure is compared against `oscillation_variance`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OscillationMeasure {
    /// Population variance of the sample values.
    #[default]
    SampleVariance,
    /// Variance of consecutive step changes. Ignores slow drift, so a
    /// steady ramp never oscillates however long it runs.
    StepVariance,
}

/// Thresholds shared by the forecaster and the divergence analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Variance above which a series oscillates, measured per
    /// `oscillation_measure`.
    pub oscillation_variance: f64,
    pub oscillation_measure: OscillationMeasure,
    /// Half-over-half mean change that counts as a breakthrough.
    pub breakthrough_change: f64,
    /// Half-over-half mean change that counts as ascending/descending.
    pub trend_change: f64,
    /// Seconds per time unit for velocity and horizon. Default: one day.
    pub time_unit_secs: u64,
    /// Upper bound on reconstructions per `Sampling::Every` window.
    pub max_samples: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            oscillation_variance: 6.0,
            oscillation_measure: OscillationMeasure::SampleVariance,
            breakthrough_change: 3.0,
            trend_change: 0.5,
            time_unit_secs: 86_400,
            max_samples: 10_000,
        }
    }
}
