//! Variable store used to pass data between commands

use super::errors::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar value held by the [`VariableStore`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoreValue {
    /// Boolean value
    Bool(bool),
    /// Numeric value
    Number(f64),
    /// Text value
    String(String),
}

impl fmt::Display for StoreValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

impl From<&str> for StoreValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for StoreValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for StoreValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for StoreValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for StoreValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Key/value table shared by every command of a pipeline run.
///
/// Assigning a name twice is rejected unless the caller asks for an
/// overwrite. There is no locking: the store is handed down the execution
/// walk by `&mut`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableStore {
    variables: BTreeMap<String, StoreValue>,
}

impl VariableStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the current value of a variable
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&StoreValue> {
        self.variables.get(name)
    }

    /// Assigns a variable.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DuplicateVariable`] if `name` already holds a
    /// value and `overwrite` is false.
    pub fn set(
        &mut self,
        name: impl Into<String>,
        value: impl Into<StoreValue>,
        overwrite: bool,
    ) -> Result<(), PipelineError> {
        let name = name.into();
        if !overwrite
            && let Some(existing) = self.variables.get(&name)
        {
            return Err(PipelineError::DuplicateVariable {
                existing: existing.clone(),
                name,
            });
        }
        self.variables.insert(name, value.into());
        Ok(())
    }

    /// Assigns a variable unconditionally, returning the previous value
    pub fn replace(
        &mut self,
        name: impl Into<String>,
        value: impl Into<StoreValue>,
    ) -> Option<StoreValue> {
        self.variables.insert(name.into(), value.into())
    }

    /// Returns true if the variable holds a value
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Lists assigned variable names in sorted order
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        self.variables.keys().map(String::as_str).collect()
    }

    /// Number of assigned variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if no variable is assigned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
