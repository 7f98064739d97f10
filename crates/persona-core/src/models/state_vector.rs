//! State vectors and partial-state deltas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A full state: every declared dimension mapped to a bounded value.
///
/// Only [`DimensionSchema`](super::DimensionSchema) constructs or mutates
/// states, so any vector handed out by the store respects its bounds.
/// Deserialized vectors are untrusted until validated against the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVector {
    values: BTreeMap<String, f64>,
}

impl StateVector {
    pub(crate) fn from_validated(values: BTreeMap<String, f64>) -> Self {
        Self { values }
    }

    pub(crate) fn set_unchecked(&mut self, name: &str, value: f64) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        } else {
            self.values.insert(name.to_string(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, f64> {
        &self.values
    }

    /// Largest absolute per-dimension difference. Dimensions missing from
    /// either side count as infinitely far apart.
    pub fn max_abs_difference(&self, other: &StateVector) -> f64 {
        let mut worst = 0.0_f64;
        for (name, a) in &self.values {
            match other.values.get(name) {
                Some(b) => worst = worst.max((a - b).abs()),
                None => return f64::INFINITY,
            }
        }
        if other.values.keys().any(|k| !self.values.contains_key(k)) {
            return f64::INFINITY;
        }
        worst
    }
}

/// A partial state change: dimension name → increment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateDelta(BTreeMap<String, f64>);

impl StateDelta {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, dimension: impl Into<String>, value: f64) -> Self {
        self.0.insert(dimension.into(), value);
        self
    }

    pub fn insert(&mut self, dimension: impl Into<String>, value: f64) {
        self.0.insert(dimension.into(), value);
    }

    /// Add to an existing entry (or create it).
    pub fn accumulate(&mut self, dimension: &str, value: f64) {
        *self.0.entry(dimension.to_string()).or_insert(0.0) += value;
    }

    pub fn get(&self, dimension: &str) -> Option<f64> {
        self.0.get(dimension).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self(self.0.iter().map(|(k, v)| (k.clone(), v * factor)).collect())
    }
}

impl FromIterator<(String, f64)> for StateDelta {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
