//! Signal extraction strategies for contextual reconstruction.

pub mod keyword;
pub mod strategy;

pub use keyword::{KeywordRule, KeywordSignalExtractor};
pub use strategy::ExtractionStrategy;
