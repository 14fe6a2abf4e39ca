//! Typed access to validated tool arguments.
//!
//! By the time an operation runs, the registry has checked every argument
//! against the tool's schema, so these accessors mostly unwrap what is known
//! to be there. They still fail with a validation error rather than panic if
//! an operation asks for something its schema does not guarantee.

use serde_json::{Map, Value};
use shopify_admin_mcp_core::legacy_id;

use crate::error::ToolError;

/// Arguments of one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    #[must_use]
    pub const fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Raw value; `null` counts as absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    /// Whether any of `names` is present.
    #[must_use]
    pub fn has_any(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.get(name).is_some())
    }

    /// # Errors
    ///
    /// Returns a validation error if the argument is missing or not a string.
    pub fn str(&self, name: &str) -> Result<&str, ToolError> {
        self.opt_str(name).ok_or_else(|| missing(name))
    }

    #[must_use]
    pub fn opt_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// A Shopify ID given as a string or an integer, trimmed.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the argument is missing or empty, or is a
    /// GID with no ID after the resource type.
    pub fn id(&self, name: &str) -> Result<String, ToolError> {
        let id = self.opt_id(name).ok_or_else(|| missing(name))?;
        if legacy_id(&id).is_empty() {
            return Err(ToolError::invalid(name, "is not a valid ID"));
        }
        Ok(id)
    }

    #[must_use]
    pub fn opt_id(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
            _ => None,
        }
    }

    #[must_use]
    pub fn opt_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// # Errors
    ///
    /// Returns a validation error if the argument is missing or not an integer.
    pub fn i64(&self, name: &str) -> Result<i64, ToolError> {
        self.opt_i64(name).ok_or_else(|| missing(name))
    }

    #[must_use]
    pub fn i64_or(&self, name: &str, default: i64) -> i64 {
        self.opt_i64(name).unwrap_or(default)
    }

    #[must_use]
    pub fn opt_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn opt_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    #[must_use]
    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        self.opt_bool(name).unwrap_or(default)
    }

    /// # Errors
    ///
    /// Returns a validation error if the argument is missing or not an array.
    pub fn array(&self, name: &str) -> Result<&Vec<Value>, ToolError> {
        self.opt_array(name).ok_or_else(|| missing(name))
    }

    #[must_use]
    pub fn opt_array(&self, name: &str) -> Option<&Vec<Value>> {
        self.get(name).and_then(Value::as_array)
    }

    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub const fn as_map_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.0
    }

    #[must_use]
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn missing(name: &str) -> ToolError {
    ToolError::invalid(name, "is required")
}

/// Copy the present arguments named in `fields` into a new JSON object,
/// renaming each `(from, to)` pair.
#[must_use]
pub fn pick(args: &Arguments, fields: &[(&str, &str)]) -> Map<String, Value> {
    fields
        .iter()
        .filter_map(|(from, to)| args.get(from).map(|v| ((*to).to_string(), v.clone())))
        .collect()
}
