//! Collaborators the mash model reads from and writes to.
//!
//! The model never touches presentation directly: parameters come from a
//! [`ParameterStore`] and derived values go out through a [`ResultSink`].

use crate::equations::liters_to_gallons;
use crate::{Error, ParameterKey, Result, ResultKey};
use std::collections::{BTreeMap, HashMap};

/// Source of user-editable numeric parameters
pub trait ParameterStore {
    /// Current value of `key`, or `InvalidNumericInput` if the field does not
    /// hold a finite number
    fn get(&self, key: ParameterKey) -> Result<f64>;

    fn set(&mut self, key: ParameterKey, value: f64);
}

/// Destination for derived results
pub trait ResultSink {
    /// Record a derived value (and its gallon twin for volume slots)
    fn write(&mut self, key: ResultKey, value: f64);

    /// Previously written value, 0 if the slot was never written
    fn read(&self, key: ResultKey) -> f64;

    /// Flag a slot as good or bad for presentation
    fn mark_status(&mut self, key: ResultKey, is_good: bool);

    /// Drop per-infusion slots at or beyond `index`
    fn clear_infusions_from(&mut self, index: usize);
}

// ============================================================================
// Form-backed parameter store
// ============================================================================

/// Parameter store holding the raw text of each input field
#[derive(Clone, Debug, Default)]
pub struct FormParameters {
    fields: HashMap<ParameterKey, String>,
}

impl FormParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store text exactly as typed, numeric or not
    pub fn set_input(&mut self, key: ParameterKey, input: impl Into<String>) {
        self.fields.insert(key, input.into());
    }

    /// Raw text of a field, if it was ever set
    pub fn input(&self, key: ParameterKey) -> Option<&str> {
        self.fields.get(&key).map(String::as_str)
    }
}

impl ParameterStore for FormParameters {
    fn get(&self, key: ParameterKey) -> Result<f64> {
        let input = self.input(key).unwrap_or_default();
        match input.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(Error::InvalidNumericInput {
                key,
                input: input.to_string(),
            }),
        }
    }

    fn set(&mut self, key: ParameterKey, value: f64) {
        self.fields.insert(key, value.to_string());
    }
}

// ============================================================================
// In-memory result table
// ============================================================================

/// One row of the result table
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResultEntry {
    pub value: f64,
    /// Gallon twin, present for volume slots only
    pub gallons: Option<f64>,
    /// Good/bad flag, present once the slot has been marked
    pub good: Option<bool>,
}

/// Result sink keeping every slot in memory, ordered by key
#[derive(Clone, Debug, Default)]
pub struct ResultTable {
    entries: BTreeMap<ResultKey, ResultEntry>,
}

impl ResultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(&self, key: ResultKey) -> Option<&ResultEntry> {
        self.entries.get(&key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&ResultKey, &ResultEntry)> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResultSink for ResultTable {
    fn write(&mut self, key: ResultKey, value: f64) {
        let entry = self.entries.entry(key).or_default();
        entry.value = value;
        entry.gallons = key.is_volume().then(|| liters_to_gallons(value));
    }

    fn read(&self, key: ResultKey) -> f64 {
        self.entries.get(&key).map_or(0.0, |e| e.value)
    }

    fn mark_status(&mut self, key: ResultKey, is_good: bool) {
        self.entries.entry(key).or_default().good = Some(is_good);
    }

    fn clear_infusions_from(&mut self, index: usize) {
        self.entries.retain(|key, _| match key {
            ResultKey::InfusionTemperature(i) | ResultKey::InfusionVolume(i) => *i < index,
            _ => true,
        });
    }
}
