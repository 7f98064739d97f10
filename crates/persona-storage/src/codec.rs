//! Column encodings: RFC 3339 timestamps and zstd-compressed state blobs.

use chrono::{DateTime, SecondsFormat, Utc};

use persona_core::errors::{PersonaResult, StorageError};
use persona_core::models::StateVector;
use persona_core::PersonaError;

use crate::corrupt;

const ZSTD_LEVEL: i32 = 3;

/// Fixed-width UTC form, so lexical order in SQLite matches time order.
pub fn time_to_sql(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn time_from_sql(table: &str, raw: &str) -> PersonaResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| corrupt(table, format!("timestamp '{raw}': {e}")))
}

pub fn compress_state(state: &StateVector) -> PersonaResult<Vec<u8>> {
    let json = serde_json::to_vec(state)?;
    zstd::encode_all(json.as_slice(), ZSTD_LEVEL).map_err(|e| {
        PersonaError::Storage(StorageError::Compression {
            message: format!("zstd compress: {e}"),
        })
    })
}

pub fn decompress_state(compressed: &[u8]) -> PersonaResult<StateVector> {
    let json = zstd::decode_all(compressed).map_err(|e| {
        PersonaError::Storage(StorageError::Compression {
            message: format!("zstd decompress: {e}"),
        })
    })?;
    serde_json::from_slice(&json)
        .map_err(|e| corrupt("timeline_snapshots", format!("state payload: {e}")))
}
