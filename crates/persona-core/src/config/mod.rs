pub mod blending_config;
pub mod cache_config;
pub mod confidence_config;
pub mod forecast_config;
pub mod observability_config;
pub mod temporal_config;

use serde::{Deserialize, Serialize};

pub use blending_config::{BlendingConfig, MAX_LOOKBACK_DAYS};
pub use cache_config::CacheConfig;
pub use confidence_config::ConfidenceConfig;
pub use forecast_config::{ForecastConfig, OscillationMeasure};
pub use observability_config::ObservabilityConfig;
pub use temporal_config::TemporalConfig;

use crate::errors::{PersonaError, PersonaResult};
use crate::models::{default_dimensions, DimensionSchema, DimensionSpec};

/// Top-level configuration aggregating all subsystem configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaConfig {
    pub dimensions: Vec<DimensionSpec>,
    pub temporal: TemporalConfig,
    pub cache: CacheConfig,
    pub blending: BlendingConfig,
    pub confidence: ConfidenceConfig,
    pub forecast: ForecastConfig,
    pub observability: ObservabilityConfig,
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            dimensions: default_dimensions(),
            temporal: TemporalConfig::default(),
            cache: CacheConfig::default(),
            blending: BlendingConfig::default(),
            confidence: ConfidenceConfig::default(),
            forecast: ForecastConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl PersonaConfig {
    /// Load config from a TOML string, falling back to defaults for missing fields.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Validated dimension schema.
    pub fn schema(&self) -> PersonaResult<DimensionSchema> {
        Ok(DimensionSchema::new(self.dimensions.clone())?)
    }

    /// Reject settings no engine could run with.
    pub fn validate(&self) -> PersonaResult<()> {
        self.schema()?;
        if self.forecast.time_unit_secs == 0 {
            return Err(PersonaError::Config(
                "forecast.time_unit_secs must be positive".to_string(),
            ));
        }
        if self.forecast.trend_change > self.forecast.breakthrough_change {
            return Err(PersonaError::Config(format!(
                "forecast.trend_change ({}) must not exceed forecast.breakthrough_change ({})",
                self.forecast.trend_change, self.forecast.breakthrough_change
            )));
        }
        if !(0.0..=1.0).contains(&self.blending.weight) {
            return Err(PersonaError::Config(format!(
                "blending.weight {} outside [0, 1]",
                self.blending.weight
            )));
        }
        if !(0..=MAX_LOOKBACK_DAYS).contains(&self.blending.lookback_days) {
            return Err(PersonaError::Config(format!(
                "blending.lookback_days {} outside [0, {MAX_LOOKBACK_DAYS}]",
                self.blending.lookback_days
            )));
        }
        if self.blending.recency_half_life_days <= 0.0 {
            return Err(PersonaError::Config(
                "blending.recency_half_life_days must be positive".to_string(),
            ));
        }
        if self.confidence.distance_decay_days <= 0.0 {
            return Err(PersonaError::Config(
                "confidence.distance_decay_days must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
