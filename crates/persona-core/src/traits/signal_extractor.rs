//! ISignalExtractor — turns an interaction into a proposed state delta.

use serde::{Deserialize, Serialize};

use crate::models::{InteractionRecord, StateDelta};

/// A proposed delta and how much the extractor trusts it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalExtraction {
    pub delta: StateDelta,
    /// In `[0, 1]`. Values outside are clamped by the consumer.
    pub confidence: f64,
}

impl SignalExtraction {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.delta.is_empty() || self.confidence <= 0.0
    }
}

/// Pluggable extraction capability.
///
/// The store treats the output as untrusted: unknown dimensions and
/// non-finite values are dropped and every blended value is clamped.
pub trait ISignalExtractor: Send + Sync {
    fn extract(&self, record: &InteractionRecord) -> SignalExtraction;

    /// Short label for logs.
    fn name(&self) -> &str {
        "custom"
    }
}
