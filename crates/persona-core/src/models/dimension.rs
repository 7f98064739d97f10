//! Dimension declarations and the closed schema every state vector obeys.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{StateDelta, StateVector};
use crate::errors::{PersonaError, PersonaResult, ValidationError};

/// One scalar dimension of the subject's state.
///
/// Values live in `[lower(), max]`, where `lower()` is the floor when one is
/// configured. Loyalty on a 0–10 scale with a floor of 5 never drops below 5
/// no matter how negative the replayed deltas are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSpec {
    pub name: String,
    pub min: f64,
    pub max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<f64>,
    /// Value used when no snapshot precedes a query.
    pub baseline: f64,
}

impl DimensionSpec {
    pub fn new(name: impl Into<String>, min: f64, max: f64, baseline: f64) -> Self {
        Self {
            name: name.into(),
            min,
            max,
            floor: None,
            baseline,
        }
    }

    pub fn with_floor(mut self, floor: f64) -> Self {
        self.floor = Some(floor);
        self
    }

    /// Effective lower bound: the floor if configured, otherwise `min`.
    pub fn lower(&self) -> f64 {
        self.floor.map_or(self.min, |f| f.max(self.min))
    }

    pub fn upper(&self) -> f64 {
        self.max
    }

    /// Width of the declared range. A single delta larger than this is
    /// structurally invalid.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower(), self.upper())
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.lower() && value <= self.upper()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::InvalidSchema(
                "dimension name must not be empty".to_string(),
            ));
        }
        if !self.min.is_finite() || !self.max.is_finite() || self.min >= self.max {
            return Err(ValidationError::InvalidSchema(format!(
                "'{}' needs finite min < max, got [{}, {}]",
                self.name, self.min, self.max
            )));
        }
        if let Some(floor) = self.floor {
            if !floor.is_finite() || floor < self.min || floor > self.max {
                return Err(ValidationError::InvalidSchema(format!(
                    "'{}' floor {} outside [{}, {}]",
                    self.name, floor, self.min, self.max
                )));
            }
        }
        if !self.contains(self.baseline) {
            return Err(ValidationError::InvalidSchema(format!(
                "'{}' baseline {} outside [{}, {}]",
                self.name,
                self.baseline,
                self.lower(),
                self.upper()
            )));
        }
        Ok(())
    }
}

/// The fixed, validated set of dimensions for one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DimensionSpec>", into = "Vec<DimensionSpec>")]
pub struct DimensionSchema {
    specs: Vec<DimensionSpec>,
}

impl DimensionSchema {
    pub fn new(specs: Vec<DimensionSpec>) -> Result<Self, ValidationError> {
        if specs.is_empty() {
            return Err(ValidationError::InvalidSchema(
                "at least one dimension is required".to_string(),
            ));
        }
        let mut seen = HashSet::with_capacity(specs.len());
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(ValidationError::InvalidSchema(format!(
                    "duplicate dimension '{}'",
                    spec.name
                )));
            }
        }
        Ok(Self { specs })
    }

    /// Trust-profile defaults: four dimensions on a 0–10 scale.
    pub fn default_profile() -> Self {
        Self {
            specs: default_dimensions(),
        }
    }

    pub fn specs(&self) -> &[DimensionSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&DimensionSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Like [`get`](Self::get) but fails with `UnknownDimension`.
    pub fn require(&self, name: &str) -> PersonaResult<&DimensionSpec> {
        self.get(name).ok_or_else(|| PersonaError::UnknownDimension {
            name: name.to_string(),
        })
    }

    /// The configured baseline state.
    pub fn baseline(&self) -> StateVector {
        StateVector::from_validated(
            self.specs
                .iter()
                .map(|s| (s.name.clone(), s.baseline))
                .collect(),
        )
    }

    /// Build a state from explicit values. Every dimension must be present
    /// and within bounds; extra names are rejected.
    pub fn state_from(&self, values: BTreeMap<String, f64>) -> Result<StateVector, ValidationError> {
        let state = StateVector::from_validated(values);
        self.validate_state(&state)?;
        Ok(state)
    }

    /// Build a state by clamping every value into bounds. Missing dimensions
    /// take their baseline.
    pub fn state_clamped(&self, values: &BTreeMap<String, f64>) -> Result<StateVector, ValidationError> {
        let mut out = BTreeMap::new();
        for spec in &self.specs {
            let raw = values.get(&spec.name).copied().unwrap_or(spec.baseline);
            if !raw.is_finite() {
                return Err(ValidationError::NonFinite {
                    dimension: spec.name.clone(),
                });
            }
            out.insert(spec.name.clone(), spec.clamp(raw));
        }
        for name in values.keys() {
            if self.get(name).is_none() {
                return Err(ValidationError::UnknownDimension { name: name.clone() });
            }
        }
        Ok(StateVector::from_validated(out))
    }

    pub fn validate_state(&self, state: &StateVector) -> Result<(), ValidationError> {
        for (name, _) in state.iter() {
            if self.get(name).is_none() {
                return Err(ValidationError::UnknownDimension {
                    name: name.to_string(),
                });
            }
        }
        for spec in &self.specs {
            let value = state
                .get(&spec.name)
                .ok_or_else(|| ValidationError::MissingDimension {
                    name: spec.name.clone(),
                })?;
            if !value.is_finite() {
                return Err(ValidationError::NonFinite {
                    dimension: spec.name.clone(),
                });
            }
            if !spec.contains(value) {
                return Err(ValidationError::OutOfBounds {
                    dimension: spec.name.clone(),
                    value,
                    lower: spec.lower(),
                    upper: spec.upper(),
                });
            }
        }
        Ok(())
    }

    /// Structural checks for an event delta. Bounds are not enforced here;
    /// clamping happens at replay time.
    pub fn validate_delta(&self, delta: &StateDelta) -> Result<(), ValidationError> {
        if delta.is_empty() {
            return Err(ValidationError::EmptyDelta);
        }
        for (name, value) in delta.iter() {
            let spec = self
                .get(name)
                .ok_or_else(|| ValidationError::UnknownDimension {
                    name: name.to_string(),
                })?;
            if !value.is_finite() {
                return Err(ValidationError::NonFinite {
                    dimension: name.to_string(),
                });
            }
            if value.abs() > spec.span() {
                return Err(ValidationError::DeltaExceedsSpan {
                    dimension: name.to_string(),
                    delta: value,
                    span: spec.span(),
                });
            }
        }
        Ok(())
    }

    /// Fold a delta onto a state, clamping each touched dimension into
    /// `[lower, max]`. Unknown or non-finite entries are skipped, so the
    /// result always satisfies the bounds invariant.
    pub fn apply_delta(&self, state: &mut StateVector, delta: &StateDelta) {
        for (name, value) in delta.iter() {
            if !value.is_finite() {
                continue;
            }
            let Some(spec) = self.get(name) else {
                continue;
            };
            let current = state.get(name).unwrap_or(spec.baseline);
            state.set_unchecked(name, spec.clamp(current + value));
        }
    }
}

impl TryFrom<Vec<DimensionSpec>> for DimensionSchema {
    type Error = ValidationError;

    fn try_from(specs: Vec<DimensionSpec>) -> Result<Self, Self::Error> {
        Self::new(specs)
    }
}

impl From<DimensionSchema> for Vec<DimensionSpec> {
    fn from(schema: DimensionSchema) -> Self {
        schema.specs
    }
}

impl Default for DimensionSchema {
    fn default() -> Self {
        Self::default_profile()
    }
}

pub(crate) fn default_dimensions() -> Vec<DimensionSpec> {
    vec![
        DimensionSpec::new("trust", 0.0, 10.0, 5.0),
        DimensionSpec::new("autonomy", 0.0, 10.0, 5.0),
        DimensionSpec::new("protectiveness", 0.0, 10.0, 5.0),
        DimensionSpec::new("loyalty", 0.0, 10.0, 7.0).with_floor(5.0),
    ]
}
