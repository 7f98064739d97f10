//! Reconstruction inputs and outputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StateVector;

/// How a reconstructed state was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Basis {
    /// Target equals a snapshot timestamp.
    SnapshotExact,
    /// Snapshot plus replayed events.
    Replayed,
    /// No snapshot at or before the target: baseline plus any earlier events.
    ExtrapolatedBackward,
    /// Projected from historical velocity and acceleration.
    Forecast,
}

impl Basis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SnapshotExact => "snapshot-exact",
            Self::Replayed => "replayed",
            Self::ExtrapolatedBackward => "extrapolated-backward",
            Self::Forecast => "forecast",
        }
    }
}

/// How much work a reconstruction does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    /// Snapshot + event replay.
    Core,
    /// Core, then blend signals extracted from recent interactions.
    Contextual,
}

impl Depth {
    pub fn blends_context(self) -> bool {
        matches!(self, Self::Contextual)
    }
}

/// Result of a point-in-time query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionResult {
    pub target: DateTime<Utc>,
    pub state: StateVector,
    /// In `[0, 1]`.
    pub confidence: f64,
    pub basis: Basis,
    /// Timestamp of the snapshot the replay started from; `None` for the baseline.
    pub anchor: Option<DateTime<Utc>>,
    pub events_replayed: usize,
    pub signals_blended: usize,
}

/// A raw interaction the signal extractor may turn into a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl InteractionRecord {
    pub fn new(timestamp: DateTime<Utc>, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            content: content.into(),
            channel: None,
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }
}

/// Optional contextual input for `Depth::Contextual` reconstructions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconstructionContext {
    pub interactions: Vec<InteractionRecord>,
}

impl ReconstructionContext {
    pub fn new(interactions: Vec<InteractionRecord>) -> Self {
        Self { interactions }
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Content hash used in cache keys. Empty contexts hash to
    /// [`ContextFingerprint::NONE`], the same as no context at all.
    pub fn fingerprint(&self) -> ContextFingerprint {
        if self.interactions.is_empty() {
            return ContextFingerprint::NONE;
        }
        let mut hasher = blake3::Hasher::new();
        for record in &self.interactions {
            hasher.update(record.id.as_bytes());
            hasher.update(record.timestamp.to_rfc3339().as_bytes());
            hasher.update(&(record.content.len() as u64).to_le_bytes());
            hasher.update(record.content.as_bytes());
            if let Some(channel) = &record.channel {
                hasher.update(channel.as_bytes());
            }
            hasher.update(&[0xff]);
        }
        ContextFingerprint(*hasher.finalize().as_bytes())
    }
}

/// blake3 digest of a reconstruction context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextFingerprint(pub [u8; 32]);

impl ContextFingerprint {
    pub const NONE: Self = Self([0u8; 32]);

    pub fn of(context: Option<&ReconstructionContext>) -> Self {
        context.map_or(Self::NONE, ReconstructionContext::fingerprint)
    }
}
