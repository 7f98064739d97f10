//! Contextual blending configuration.

use serde::{Deserialize, Serialize};

/// Upper bound on `lookback_days`: one hundred years.
pub const MAX_LOOKBACK_DAYS: i64 = 36_500;

/// How interaction signals are blended into a contextual reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendingConfig {
    /// Interactions older than this (relative to the target) are ignored.
    /// In `[0, MAX_LOOKBACK_DAYS]`.
    pub lookback_days: i64,
    /// Signal weight halves every `recency_half_life_days` of age.
    pub recency_half_life_days: f64,
    /// Scale applied to the weighted mean signal delta. In `[0, 1]`.
    pub weight: f64,
    /// Most recent interactions considered per reconstruction.
    pub max_interactions: usize,
}

impl Default for BlendingConfig {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            recency_half_life_days: 7.0,
            weight: 0.25,
            max_interactions: 256,
        }
    }
}
