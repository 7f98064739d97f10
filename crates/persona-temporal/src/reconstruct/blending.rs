//! Contextual blending: fold extracted interaction signals onto a
//! reconstructed core state.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use persona_core::config::BlendingConfig;
use persona_core::models::{DimensionSchema, ReconstructionContext, StateDelta, StateVector};
use persona_core::traits::ISignalExtractor;

const SECS_PER_DAY: f64 = 86_400.0;

/// Blend signals from interactions in `[target - lookback, target]` onto
/// `state`. Returns how many interactions contributed.
///
/// Each interaction's weight is its extraction confidence times
/// `0.5^(age / half_life)`. Per dimension the weighted sum is normalized by
/// `max(total weight, 1)`, so a lone weak or old signal moves the state
/// less than a fresh confident one, then scaled by the blend weight.
/// Unknown dimensions and non-finite values are dropped; every result is
/// clamped by the schema.
pub fn blend_signals(
    schema: &DimensionSchema,
    state: &mut StateVector,
    target: DateTime<Utc>,
    context: &ReconstructionContext,
    extractor: &dyn ISignalExtractor,
    config: &BlendingConfig,
) -> usize {
    let window_start = Duration::try_days(config.lookback_days.max(0))
        .and_then(|lookback| target.checked_sub_signed(lookback))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let mut recent: Vec<_> = context
        .interactions
        .iter()
        .filter(|r| r.timestamp >= window_start && r.timestamp <= target)
        .collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    recent.truncate(config.max_interactions);

    let mut weighted: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    let mut contributing = 0;

    for record in recent {
        let extraction = extractor.extract(record);
        if extraction.is_empty() || !extraction.confidence.is_finite() {
            continue;
        }
        let confidence = extraction.confidence.clamp(0.0, 1.0);
        let age_days = (target - record.timestamp).num_seconds().max(0) as f64 / SECS_PER_DAY;
        let recency = if config.recency_half_life_days > 0.0 {
            0.5_f64.powf(age_days / config.recency_half_life_days)
        } else {
            1.0
        };
        let weight = confidence * recency;
        if weight <= 0.0 {
            continue;
        }

        let mut used = false;
        for (name, value) in extraction.delta.iter() {
            if !value.is_finite() {
                tracing::debug!(extractor = extractor.name(), dimension = name, "dropping non-finite signal");
                continue;
            }
            let Some(spec) = schema.get(name) else {
                tracing::debug!(extractor = extractor.name(), dimension = name, "dropping signal for unknown dimension");
                continue;
            };
            let slot = weighted.entry(spec.name.as_str()).or_insert((0.0, 0.0));
            slot.0 += weight * value;
            slot.1 += weight;
            used = true;
        }
        if used {
            contributing += 1;
        }
    }

    let blended: StateDelta = weighted
        .into_iter()
        .map(|(name, (sum, total))| (name.to_string(), config.weight * sum / total.max(1.0)))
        .collect();
    schema.apply_delta(state, &blended);
    contributing
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::models::InteractionRecord;
    use persona_core::traits::SignalExtraction;

    struct Fixed(StateDelta, f64);

    impl ISignalExtractor for Fixed {
        fn extract(&self, _record: &InteractionRecord) -> SignalExtraction {
            SignalExtraction {
                delta: self.0.clone(),
                confidence: self.1,
            }
        }
    }

    fn config() -> BlendingConfig {
        BlendingConfig {
            weight: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn fresh_confident_signal_applies_in_full() {
        let schema = DimensionSchema::default_profile();
        let mut state = schema.baseline();
        let t = Utc::now();
        let ctx = ReconstructionContext::new(vec![InteractionRecord::new(t, "hi")]);
        let extractor = Fixed(StateDelta::new().with("trust", 2.0), 1.0);

        let n = blend_signals(&schema, &mut state, t, &ctx, &extractor, &config());
        assert_eq!(n, 1);
        assert!((state.get("trust").unwrap() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn old_signal_decays_and_out_of_window_is_ignored() {
        let schema = DimensionSchema::default_profile();
        let t = Utc::now();
        let extractor = Fixed(StateDelta::new().with("trust", 2.0), 1.0);

        let mut state = schema.baseline();
        let week_old = ReconstructionContext::new(vec![InteractionRecord::new(t - Duration::days(7), "x")]);
        blend_signals(&schema, &mut state, t, &week_old, &extractor, &config());
        assert!((state.get("trust").unwrap() - 6.0).abs() < 1e-6);

        let mut untouched = schema.baseline();
        let stale = ReconstructionContext::new(vec![
            InteractionRecord::new(t - Duration::days(45), "x"),
            InteractionRecord::new(t + Duration::days(1), "future"),
        ]);
        let n = blend_signals(&schema, &mut untouched, t, &stale, &extractor, &config());
        assert_eq!(n, 0);
        assert_eq!(untouched, schema.baseline());
    }

    #[test]
    fn window_saturates_at_the_earliest_representable_instant() {
        let schema = DimensionSchema::default_profile();
        let extractor = Fixed(StateDelta::new().with("trust", 2.0), 1.0);

        let earliest = DateTime::<Utc>::MIN_UTC;
        let mut state = schema.baseline();
        let ctx = ReconstructionContext::new(vec![InteractionRecord::new(earliest, "first")]);
        assert_eq!(blend_signals(&schema, &mut state, earliest, &ctx, &extractor, &config()), 1);

        let t = Utc::now();
        let unbounded = BlendingConfig {
            lookback_days: i64::MAX,
            ..config()
        };
        let mut state = schema.baseline();
        let ctx = ReconstructionContext::new(vec![InteractionRecord::new(t - Duration::days(400), "old")]);
        assert_eq!(blend_signals(&schema, &mut state, t, &ctx, &extractor, &unbounded), 1);
    }

    #[test]
    fn untrusted_output_is_sanitized() {
        let schema = DimensionSchema::default_profile();
        let t = Utc::now();
        let mut state = schema.baseline();
        let ctx = ReconstructionContext::new(vec![InteractionRecord::new(t, "x")]);
        let mut delta = StateDelta::new().with("charisma", 3.0).with("trust", f64::NAN);
        delta.insert("autonomy", 1_000.0);
        let extractor = Fixed(delta, 5.0);

        let n = blend_signals(&schema, &mut state, t, &ctx, &extractor, &config());
        assert_eq!(n, 1);
        assert_eq!(state.get("trust"), Some(5.0));
        assert_eq!(state.get("autonomy"), Some(10.0));
        assert!(state.get("charisma").is_none());
    }
}
