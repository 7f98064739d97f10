mod persistence;
mod signal_extractor;
mod temporal_query;

pub use persistence::ITimelinePersistence;
pub use signal_extractor::{ISignalExtractor, SignalExtraction};
pub use temporal_query::ITemporalQuery;
