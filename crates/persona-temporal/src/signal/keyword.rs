//! Keyword-rule signal extractor.

use serde::{Deserialize, Serialize};

use persona_core::models::{InteractionRecord, StateDelta};
use persona_core::traits::{ISignalExtractor, SignalExtraction};

/// `keyword` appearing in an interaction nudges `dimension` by `delta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub keyword: String,
    pub dimension: String,
    pub delta: f64,
}

impl KeywordRule {
    pub fn new(keyword: impl Into<String>, dimension: impl Into<String>, delta: f64) -> Self {
        Self {
            keyword: keyword.into().to_lowercase(),
            dimension: dimension.into(),
            delta,
        }
    }
}

/// Case-insensitive substring matching. Confidence grows with the number of
/// distinct rules matched, up to a cap.
#[derive(Debug, Clone)]
pub struct KeywordSignalExtractor {
    rules: Vec<KeywordRule>,
    confidence_per_match: f64,
    max_confidence: f64,
}

impl KeywordSignalExtractor {
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        Self {
            rules,
            confidence_per_match: 0.35,
            max_confidence: 0.9,
        }
    }

    pub fn with_confidence(mut self, per_match: f64, max: f64) -> Self {
        self.confidence_per_match = per_match;
        self.max_confidence = max;
        self
    }

    /// Rules for the default trust/autonomy/protectiveness/loyalty profile.
    pub fn with_default_rules() -> Self {
        Self::new(vec![
            KeywordRule::new("thank", "trust", 0.5),
            KeywordRule::new("appreciate", "trust", 0.4),
            KeywordRule::new("betray", "trust", -1.0),
            KeywordRule::new("lied", "trust", -1.0),
            KeywordRule::new("decide", "autonomy", 0.3),
            KeywordRule::new("my choice", "autonomy", 0.4),
            KeywordRule::new("told me to", "autonomy", -0.3),
            KeywordRule::new("danger", "protectiveness", 0.5),
            KeywordRule::new("threat", "protectiveness", 0.5),
            KeywordRule::new("safe", "protectiveness", -0.2),
            KeywordRule::new("stand by", "loyalty", 0.4),
            KeywordRule::new("abandon", "loyalty", -0.6),
        ])
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }
}

impl Default for KeywordSignalExtractor {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl ISignalExtractor for KeywordSignalExtractor {
    fn extract(&self, record: &InteractionRecord) -> SignalExtraction {
        let content = record.content.to_lowercase();
        let mut delta = StateDelta::new();
        let mut matches = 0usize;
        for rule in &self.rules {
            if !rule.keyword.is_empty() && content.contains(&rule.keyword) {
                delta.accumulate(&rule.dimension, rule.delta);
                matches += 1;
            }
        }
        if matches == 0 {
            return SignalExtraction::empty();
        }
        SignalExtraction {
            delta,
            confidence: (matches as f64 * self.confidence_per_match).min(self.max_confidence),
        }
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn matches_are_case_insensitive_and_accumulate() {
        let extractor = KeywordSignalExtractor::with_default_rules();
        let record = InteractionRecord::new(Utc::now(), "THANK you, I appreciate it");
        let out = extractor.extract(&record);
        assert!((out.delta.get("trust").unwrap() - 0.9).abs() < 1e-9);
        assert!((out.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn no_match_is_empty() {
        let extractor = KeywordSignalExtractor::with_default_rules();
        let out = extractor.extract(&InteractionRecord::new(Utc::now(), "weather is nice"));
        assert!(out.is_empty());
    }

    #[test]
    fn confidence_is_capped() {
        let extractor = KeywordSignalExtractor::with_default_rules();
        let out = extractor.extract(&InteractionRecord::new(
            Utc::now(),
            "thank you; I appreciate it; I decide; danger; threat",
        ));
        assert!((out.confidence - 0.9).abs() < 1e-9);
    }
}
