//! Timeline event types: StateEvent, NewEvent, EventKind, Significance.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::StateDelta;
use crate::errors::ValidationError;

/// Log-assigned identifier. Monotonically increasing, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evt-{}", self.0)
    }
}

/// What kind of experience produced the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Interaction,
    Reflection,
    Milestone,
    Correction,
    Decay,
    Calibration,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interaction => "interaction",
            Self::Reflection => "reflection",
            Self::Milestone => "milestone",
            Self::Correction => "correction",
            Self::Decay => "decay",
            Self::Calibration => "calibration",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "interaction" => Some(Self::Interaction),
            "reflection" => Some(Self::Reflection),
            "milestone" => Some(Self::Milestone),
            "correction" => Some(Self::Correction),
            "decay" => Some(Self::Decay),
            "calibration" => Some(Self::Calibration),
            _ => None,
        }
    }
}

/// Event importance on a 1–10 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Significance(u8);

impl Significance {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::SignificanceOutOfRange { value })
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Significance {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Significance> for u8 {
    fn from(s: Significance) -> Self {
        s.0
    }
}

/// An appended, immutable state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEvent {
    pub id: EventId,
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    /// Partial state: only the dimensions this event moves.
    pub delta: StateDelta,
    pub significance: Significance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// An event as submitted by a caller, before the log assigns an id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub timestamp: DateTime<Utc>,
    pub kind: EventKind,
    pub delta: StateDelta,
    pub significance: u8,
    pub note: Option<String>,
}

impl NewEvent {
    /// Default significance is 5.
    pub fn new(timestamp: DateTime<Utc>, kind: EventKind, delta: StateDelta) -> Self {
        Self {
            timestamp,
            kind,
            delta,
            significance: 5,
            note: None,
        }
    }

    pub fn with_significance(mut self, significance: u8) -> Self {
        self.significance = significance;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn significance_bounds() {
        assert!(Significance::new(0).is_err());
        assert!(Significance::new(11).is_err());
        assert_eq!(Significance::new(10).unwrap().value(), 10);
        assert!(serde_json::from_str::<Significance>("12").is_err());
    }

    #[test]
    fn event_kind_serializes_snake_case() {
        let json = serde_json::to_string(&EventKind::Milestone).unwrap();
        assert_eq!(json, "\"milestone\"");
        assert_eq!(format!("\"{}\"", EventKind::Milestone.as_str()), json);
        assert_eq!(EventKind::parse("decay"), Some(EventKind::Decay));
        assert_eq!(EventKind::parse("Decay"), None);
    }
}
