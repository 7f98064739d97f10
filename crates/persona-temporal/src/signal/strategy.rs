//! Strategy selection for signal extraction.

use std::fmt;
use std::sync::Arc;

use persona_core::models::InteractionRecord;
use persona_core::traits::{ISignalExtractor, SignalExtraction};

use super::keyword::KeywordSignalExtractor;

/// Which extractor contextual reconstructions use.
#[derive(Clone, Default)]
pub enum ExtractionStrategy {
    /// Contextual depth behaves like core depth with lower confidence.
    #[default]
    Disabled,
    Keyword(KeywordSignalExtractor),
    /// Host-supplied extractor, e.g. a model-backed classifier.
    Custom(Arc<dyn ISignalExtractor>),
}

impl ExtractionStrategy {
    pub fn custom<E: ISignalExtractor + 'static>(extractor: E) -> Self {
        Self::Custom(Arc::new(extractor))
    }
}

impl ISignalExtractor for ExtractionStrategy {
    fn extract(&self, record: &InteractionRecord) -> SignalExtraction {
        match self {
            Self::Disabled => SignalExtraction::empty(),
            Self::Keyword(k) => k.extract(record),
            Self::Custom(c) => c.extract(record),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Disabled => "disabled",
            Self::Keyword(k) => k.name(),
            Self::Custom(c) => c.name(),
        }
    }
}

impl fmt::Debug for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExtractionStrategy({})", self.name())
    }
}
