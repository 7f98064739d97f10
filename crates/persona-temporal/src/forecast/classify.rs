//! Trajectory classification.

use persona_core::config::ForecastConfig;
use persona_core::models::TrajectoryType;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryThresholds {
    pub oscillation_variance: f64,
    pub breakthrough_change: f64,
    pub trend_change: f64,
}

impl From<&ForecastConfig> for TrajectoryThresholds {
    fn from(config: &ForecastConfig) -> Self {
        Self {
            oscillation_variance: config.oscillation_variance,
            breakthrough_change: config.breakthrough_change,
            trend_change: config.trend_change,
        }
    }
}

/// Classify a series by its dispersion and half-over-half change.
///
/// `variance` is whichever figure the config's `oscillation_measure` picks;
/// divergence passes `0.0` since a two-point comparison cannot oscillate.
///
/// Order matters: oscillation first, then a jump of either sign beyond the
/// breakthrough threshold, then a plain rise or fall beyond the trend
/// threshold.
pub fn classify_trajectory(
    variance: f64,
    change: f64,
    thresholds: &TrajectoryThresholds,
) -> TrajectoryType {
    if variance > thresholds.oscillation_variance {
        TrajectoryType::Oscillating
    } else if change.abs() > thresholds.breakthrough_change {
        TrajectoryType::Breakthrough
    } else if change > thresholds.trend_change {
        TrajectoryType::Ascending
    } else if change < -thresholds.trend_change {
        TrajectoryType::Descending
    } else {
        TrajectoryType::Plateau
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thresholds() -> TrajectoryThresholds {
        TrajectoryThresholds::from(&ForecastConfig::default())
    }

    #[test]
    fn ordering_of_rules() {
        let t = thresholds();
        assert_eq!(classify_trajectory(9.0, 5.0, &t), TrajectoryType::Oscillating);
        assert_eq!(classify_trajectory(2.0, 1.0, &t), TrajectoryType::Ascending);
        assert_eq!(classify_trajectory(0.0, 3.5, &t), TrajectoryType::Breakthrough);
        assert_eq!(classify_trajectory(0.0, 1.0, &t), TrajectoryType::Ascending);
        assert_eq!(classify_trajectory(0.0, -4.0, &t), TrajectoryType::Breakthrough);
        assert_eq!(classify_trajectory(0.0, -1.0, &t), TrajectoryType::Descending);
        assert_eq!(classify_trajectory(0.0, 0.2, &t), TrajectoryType::Plateau);
    }
}
