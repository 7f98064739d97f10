//! Config loading: TOML sections, serde defaults, validation.

use persona_core::config::{ForecastConfig, OscillationMeasure, TemporalConfig, MAX_LOOKBACK_DAYS};
use persona_core::errors::PersonaError;
use persona_core::PersonaConfig;

#[test]
fn empty_toml_is_all_defaults() {
    let config = PersonaConfig::from_toml("").unwrap();
    let default_config = PersonaConfig::default();
    assert_eq!(
        serde_json::to_string(&config).unwrap(),
        serde_json::to_string(&default_config).unwrap(),
        "empty TOML should produce identical config to Default::default()"
    );
    assert_eq!(config.schema().unwrap().len(), 4);
}

#[test]
fn partial_sections_keep_other_defaults() {
    let toml = r#"
        [forecast]
        oscillation_variance = 2.5

        [cache]
        capacity = 16
    "#;
    let config = PersonaConfig::from_toml(toml).unwrap();
    assert_eq!(config.forecast.oscillation_variance, 2.5);
    assert_eq!(config.forecast.trend_change, ForecastConfig::default().trend_change);
    assert_eq!(config.cache.capacity, 16);
    assert!(config.cache.enabled);
    assert_eq!(
        config.temporal.snapshot_event_threshold,
        TemporalConfig::default().snapshot_event_threshold
    );
}

#[test]
fn custom_dimensions_from_toml() {
    let toml = r#"
        [[dimensions]]
        name = "trust"
        min = 0.0
        max = 10.0
        baseline = 6.0

        [[dimensions]]
        name = "loyalty"
        min = 0.0
        max = 10.0
        floor = 5.0
        baseline = 7.0
    "#;
    let config = PersonaConfig::from_toml(toml).unwrap();
    let schema = config.schema().unwrap();
    assert_eq!(schema.len(), 2);
    assert_eq!(schema.get("loyalty").unwrap().lower(), 5.0);
    assert_eq!(schema.baseline().get("trust"), Some(6.0));
}

#[test]
fn invalid_schema_surfaces_as_validation_error() {
    let toml = r#"
        [[dimensions]]
        name = "trust"
        min = 0.0
        max = 10.0
        baseline = 42.0
    "#;
    let config = PersonaConfig::from_toml(toml).unwrap();
    assert!(matches!(config.validate(), Err(PersonaError::Validation(_))));
}

#[test]
fn inverted_thresholds_are_rejected() {
    let mut config = PersonaConfig::default();
    config.forecast.trend_change = 5.0;
    config.forecast.breakthrough_change = 1.0;
    assert!(matches!(config.validate(), Err(PersonaError::Config(_))));

    let mut config = PersonaConfig::default();
    config.forecast.time_unit_secs = 0;
    assert!(matches!(config.validate(), Err(PersonaError::Config(_))));
}

#[test]
fn lookback_outside_range_is_rejected() {
    let mut config = PersonaConfig::default();
    config.blending.lookback_days = i64::MAX;
    assert!(matches!(config.validate(), Err(PersonaError::Config(_))));

    config.blending.lookback_days = -1;
    assert!(matches!(config.validate(), Err(PersonaError::Config(_))));

    config.blending.lookback_days = MAX_LOOKBACK_DAYS;
    assert!(config.validate().is_ok());
}

#[test]
fn oscillation_measure_defaults_to_sample_variance() {
    let config = PersonaConfig::default();
    assert_eq!(config.forecast.oscillation_measure, OscillationMeasure::SampleVariance);
    assert!(config.forecast.oscillation_variance > 2.0);

    let toml = r#"
        [forecast]
        oscillation_measure = "step_variance"
    "#;
    let config = PersonaConfig::from_toml(toml).unwrap();
    assert_eq!(config.forecast.oscillation_measure, OscillationMeasure::StepVariance);
}

#[test]
fn config_json_roundtrip() {
    let mut config = PersonaConfig::default();
    config.blending.lookback_days = 14;
    let json = serde_json::to_string(&config).unwrap();
    let back: PersonaConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back.blending.lookback_days, 14);
    assert!(back.validate().is_ok());
}
