//! Hyperparameter sets and grids
//!
//! Parameter values are JSON values keyed by name, ordered for deterministic
//! iteration. A try never mutates a shared set in place: seed perturbation
//! goes through [`ParameterSet::with_seed`], which returns an isolated copy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key under which a parameter set carries its base random seed.
pub const SEED_KEY: &str = "seed";

/// An immutable-by-convention hyperparameter mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParameterSet {
    values: BTreeMap<String, Value>,
}

impl ParameterSet {
    /// Create an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Insert or replace a value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Get a raw value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Get a float value.
    #[must_use]
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    /// Get an integer value.
    #[must_use]
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    /// Get a boolean value.
    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Get a string value.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Base random seed, defaulting to 0 when unset.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.values.get(SEED_KEY).and_then(Value::as_u64).unwrap_or(0)
    }

    /// Return an isolated copy carrying `seed`.
    ///
    /// This is the only sanctioned way to perturb the seed between tries;
    /// the source set is left untouched.
    #[must_use]
    pub fn with_seed(&self, seed: u64) -> Self {
        let mut copy = self.clone();
        copy.values.insert(SEED_KEY.to_string(), Value::from(seed));
        copy
    }

    /// Iterate over `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check whether the set holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Compact `key=value` tag for experiment directory names.
    #[must_use]
    pub fn short_tag(&self) -> String {
        self.values
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{k}={s}"),
                other => format!("{k}={other}"),
            })
            .collect::<Vec<_>>()
            .join("_")
    }

    /// View the set as a JSON value for record config blocks.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}

/// A grid of candidate values per hyperparameter name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParamGrid {
    axes: BTreeMap<String, Vec<Value>>,
}

impl ParamGrid {
    /// Create an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style axis insert.
    #[must_use]
    pub fn axis(mut self, key: impl Into<String>, values: Vec<Value>) -> Self {
        self.axes.insert(key.into(), values);
        self
    }

    /// Number of parameter combinations the grid expands to.
    #[must_use]
    pub fn combination_count(&self) -> usize {
        self.axes.values().map(Vec::len).product()
    }

    /// Expand the grid into every parameter combination.
    ///
    /// Axes expand in key order, so the output order is deterministic; the
    /// first combination carries the first value of every axis.
    #[must_use]
    pub fn combinations(&self) -> Vec<ParameterSet> {
        let mut combos = vec![ParameterSet::new()];
        for (key, values) in &self.axes {
            let mut expanded = Vec::with_capacity(combos.len() * values.len());
            for combo in &combos {
                for value in values {
                    expanded.push(combo.clone().with(key.clone(), value.clone()));
                }
            }
            combos = expanded;
        }
        combos
    }
}
