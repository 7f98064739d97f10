//! Divergence analysis between two reconstructed states.

use persona_core::config::ForecastConfig;
use persona_core::models::{DimensionDelta, DimensionSchema, Direction, Divergence, StateVector};

use crate::forecast::{classify_trajectory, TrajectoryThresholds};

/// Below this, a per-dimension change counts as unchanged.
const CHANGE_EPSILON: f64 = 1e-9;

/// Compare `from` (earlier) against `to` (later), dimension by dimension in
/// schema order.
///
/// Critical invariants:
/// - compare(S, S) has zero magnitude and a plateau trajectory
/// - compare(A, B) deltas are the negation of compare(B, A) deltas
pub fn compare_states(
    schema: &DimensionSchema,
    from: &StateVector,
    to: &StateVector,
    config: &ForecastConfig,
) -> Divergence {
    let thresholds = TrajectoryThresholds::from(config);
    let mut per_dimension = Vec::with_capacity(schema.len());

    for spec in schema.specs() {
        let a = from.get(&spec.name).unwrap_or(spec.baseline);
        let b = to.get(&spec.name).unwrap_or(spec.baseline);
        let delta = b - a;
        let direction = if delta > CHANGE_EPSILON {
            Direction::Increased
        } else if delta < -CHANGE_EPSILON {
            Direction::Decreased
        } else {
            Direction::Unchanged
        };
        per_dimension.push(DimensionDelta {
            dimension: spec.name.clone(),
            from: a,
            to: b,
            delta,
            direction,
            trajectory: classify_trajectory(0.0, delta, &thresholds),
        });
    }

    let count = per_dimension.len().max(1) as f64;
    let aggregate_magnitude = per_dimension.iter().map(|d| d.delta.abs()).sum::<f64>() / count;
    let mean_signed_delta = per_dimension.iter().map(|d| d.delta).sum::<f64>() / count;

    let dominant_dimension = per_dimension
        .iter()
        .filter(|d| d.delta.abs() > CHANGE_EPSILON)
        .max_by(|x, y| x.delta.abs().total_cmp(&y.delta.abs()))
        .map(|d| d.dimension.clone());

    Divergence {
        trajectory: classify_trajectory(0.0, mean_signed_delta, &thresholds),
        per_dimension,
        aggregate_magnitude,
        mean_signed_delta,
        dominant_dimension,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::models::{StateDelta, TrajectoryType};

    #[test]
    fn identical_states_do_not_diverge() {
        let schema = DimensionSchema::default_profile();
        let s = schema.baseline();
        let d = compare_states(&schema, &s, &s, &ForecastConfig::default());
        assert_eq!(d.aggregate_magnitude, 0.0);
        assert_eq!(d.trajectory, TrajectoryType::Plateau);
        assert!(d.dominant_dimension.is_none());
        assert!(d.per_dimension.iter().all(|x| x.direction == Direction::Unchanged));
    }

    #[test]
    fn reports_direction_and_dominant_dimension() {
        let schema = DimensionSchema::default_profile();
        let a = schema.baseline();
        let mut b = a.clone();
        schema.apply_delta(&mut b, &StateDelta::new().with("trust", 4.0).with("autonomy", -1.0));

        let d = compare_states(&schema, &a, &b, &ForecastConfig::default());
        let trust = d.delta_for("trust").unwrap();
        assert_eq!(trust.direction, Direction::Increased);
        assert_eq!(trust.trajectory, TrajectoryType::Breakthrough);
        assert_eq!(d.delta_for("autonomy").unwrap().direction, Direction::Decreased);
        assert_eq!(d.dominant_dimension.as_deref(), Some("trust"));
        // (4 + 1) / 4 dimensions
        assert!((d.aggregate_magnitude - 1.25).abs() < 1e-9);

        let reversed = compare_states(&schema, &b, &a, &ForecastConfig::default());
        assert!((reversed.delta_for("trust").unwrap().delta + 4.0).abs() < 1e-9);
    }
}
