//! Kinematic projection with clamped output and a dispersion interval.

use persona_core::config::{ForecastConfig, OscillationMeasure};
use persona_core::errors::{PersonaError, PersonaResult};
use persona_core::models::{ConfidenceInterval, DimensionSpec, Forecast, Sample, TrajectoryType};

use super::classify::{classify_trajectory, TrajectoryThresholds};
use super::trend::analyze;

const MIN_FORECAST_CONFIDENCE: f64 = 0.05;

/// Forecast one dimension `horizon_units` past its last sample.
///
/// `projected = clamp(current + v·t + ½·a·t²)`; the unclamped value is kept
/// as `raw_projection`. The interval is `mean ± 2σ` of the samples, clamped.
/// A single sample yields a plateau with the full-range interval.
pub fn forecast_series(
    spec: &DimensionSpec,
    samples: &[Sample],
    horizon_units: f64,
    config: &ForecastConfig,
) -> PersonaResult<Forecast> {
    if !horizon_units.is_finite() || horizon_units < 0.0 {
        return Err(PersonaError::InvalidQuery(format!(
            "horizon must be finite and non-negative, got {horizon_units}"
        )));
    }
    if samples.iter().any(|s| !s.value.is_finite()) {
        return Err(PersonaError::InvalidQuery(format!(
            "non-finite sample for {}",
            spec.name
        )));
    }

    let mut ordered = samples.to_vec();
    ordered.sort_by_key(|s| s.timestamp);

    let Some(trend) = analyze(&ordered, config.time_unit_secs) else {
        return Err(PersonaError::insufficient_data(
            &spec.name,
            "no samples in window",
        ));
    };

    if trend.sample_count == 1 {
        return Ok(Forecast {
            dimension: spec.name.clone(),
            projected_value: spec.clamp(trend.last),
            raw_projection: trend.last,
            trajectory: TrajectoryType::Plateau,
            confidence_interval: ConfidenceInterval {
                lower: spec.lower(),
                upper: spec.upper(),
            },
            velocity: 0.0,
            acceleration: 0.0,
            sample_count: 1,
            horizon_units,
            confidence: MIN_FORECAST_CONFIDENCE,
        });
    }

    let t = horizon_units;
    let raw_projection = trend.last + trend.velocity * t + 0.5 * trend.acceleration * t * t;
    let variance = match config.oscillation_measure {
        OscillationMeasure::SampleVariance => trend.stddev * trend.stddev,
        OscillationMeasure::StepVariance => trend.step_variance,
    };
    let trajectory = classify_trajectory(
        variance,
        trend.half_change,
        &TrajectoryThresholds::from(config),
    );

    let lower = spec.clamp(trend.mean - 2.0 * trend.stddev);
    let upper = spec.clamp(trend.mean + 2.0 * trend.stddev);

    let coverage = 1.0 - 1.0 / trend.sample_count as f64;
    let reach = if trend.elapsed_units > 0.0 {
        1.0 / (1.0 + t / trend.elapsed_units)
    } else {
        0.5
    };

    Ok(Forecast {
        dimension: spec.name.clone(),
        projected_value: spec.clamp(raw_projection),
        raw_projection,
        trajectory,
        confidence_interval: ConfidenceInterval { lower, upper },
        velocity: trend.velocity,
        acceleration: trend.acceleration,
        sample_count: trend.sample_count,
        horizon_units,
        confidence: (coverage * reach).clamp(MIN_FORECAST_CONFIDENCE, 1.0),
    })
}
