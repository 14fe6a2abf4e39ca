//! Declarative tool schemas and argument validation.
//!
//! A [`ToolDefinition`] is the contract an agent sees in `tools/list`: a name,
//! a description and an ordered list of [`ParamSpec`]s. The same definition is
//! used to validate incoming arguments before any request is built, reporting
//! every violated field at once so the agent can fix them in one round trip.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::id::legacy_id;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
    /// A Shopify identifier: a string (GID or numeric) or a bare integer.
    Id,
}

impl ParamType {
    /// Human-readable name used in violation messages.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::Array => "an array",
            Self::Object => "an object",
            Self::Id => "an ID (string or integer)",
        }
    }

    /// Check whether a JSON value has this type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Id => value.is_string() || value.is_i64() || value.is_u64(),
        }
    }

    fn json_schema_type(self) -> Value {
        match self {
            Self::String => json!("string"),
            Self::Integer => json!("integer"),
            Self::Number => json!("number"),
            Self::Boolean => json!("boolean"),
            Self::Array => json!("array"),
            Self::Object => json!("object"),
            Self::Id => json!(["string", "integer"]),
        }
    }
}

/// A constraint checked after the type check passes.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Strings must contain a non-whitespace character; arrays must have an element.
    NonEmpty,
    /// Numbers must be `>=` the bound.
    Minimum(f64),
    /// Numbers must be `>` the bound.
    ExclusiveMinimum(f64),
    /// Numbers must be `<=` the bound.
    Maximum(f64),
    /// Strings must be one of the listed values (case-sensitive).
    OneOf(Vec<String>),
}

impl Constraint {
    /// Return a violation message if `value` breaks this constraint.
    fn check(&self, value: &Value) -> Option<String> {
        match self {
            Self::NonEmpty => match value {
                Value::String(s) if s.trim().is_empty() => Some("must not be empty".to_string()),
                Value::Array(items) if items.is_empty() => {
                    Some("must contain at least one item".to_string())
                }
                _ => None,
            },
            Self::Minimum(min) => value
                .as_f64()
                .filter(|n| n < min)
                .map(|_| format!("must be greater than or equal to {min}")),
            Self::ExclusiveMinimum(min) => value
                .as_f64()
                .filter(|n| n <= min)
                .map(|_| format!("must be greater than {min}")),
            Self::Maximum(max) => value
                .as_f64()
                .filter(|n| n > max)
                .map(|_| format!("must be less than or equal to {max}")),
            Self::OneOf(allowed) => value
                .as_str()
                .filter(|s| !allowed.iter().any(|a| a == s))
                .map(|_| format!("must be one of: {}", allowed.join(", "))),
        }
    }

    fn apply_to_schema(&self, schema: &mut Map<String, Value>, param_type: ParamType) {
        match self {
            Self::NonEmpty if param_type == ParamType::Array => {
                schema.insert("minItems".to_string(), json!(1));
            }
            Self::NonEmpty => {
                schema.insert("minLength".to_string(), json!(1));
            }
            Self::Minimum(min) => {
                schema.insert("minimum".to_string(), number(*min));
            }
            Self::ExclusiveMinimum(min) => {
                schema.insert("exclusiveMinimum".to_string(), number(*min));
            }
            Self::Maximum(max) => {
                schema.insert("maximum".to_string(), number(*max));
            }
            Self::OneOf(allowed) => {
                schema.insert("enum".to_string(), json!(allowed));
            }
        }
    }
}

/// Render whole-number bounds as JSON integers so schemas read naturally.
#[allow(clippy::cast_possible_truncation)] // guarded by the fract/range check
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        json!(n as i64)
    } else {
        json!(n)
    }
}

/// One declared parameter of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    name: String,
    param_type: ParamType,
    required: bool,
    description: String,
    constraints: Vec<Constraint>,
    items: Option<ParamType>,
}

impl ParamSpec {
    /// Create an optional parameter of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: false,
            description: String::new(),
            constraints: Vec::new(),
            items: None,
        }
    }

    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::String)
    }

    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Integer)
    }

    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Number)
    }

    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Boolean)
    }

    #[must_use]
    pub fn id(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Id)
    }

    /// An array whose elements must all have `items` type.
    #[must_use]
    pub fn array(name: impl Into<String>, items: ParamType) -> Self {
        let mut spec = Self::new(name, ParamType::Array);
        spec.items = Some(items);
        spec
    }

    /// Mark the parameter as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set the description shown to the agent.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Add a constraint.
    #[must_use]
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    #[must_use]
    pub fn non_empty(self) -> Self {
        self.with(Constraint::NonEmpty)
    }

    #[must_use]
    pub fn min(self, min: f64) -> Self {
        self.with(Constraint::Minimum(min))
    }

    #[must_use]
    pub fn max(self, max: f64) -> Self {
        self.with(Constraint::Maximum(max))
    }

    #[must_use]
    pub fn positive(self) -> Self {
        self.with(Constraint::ExclusiveMinimum(0.0))
    }

    #[must_use]
    pub fn one_of(self, allowed: &[&str]) -> Self {
        self.with(Constraint::OneOf(
            allowed.iter().map(|s| (*s).to_string()).collect(),
        ))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn param_type(&self) -> ParamType {
        self.param_type
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Validate one present, non-null value, appending violations.
    fn check(&self, value: &Value, violations: &mut Vec<FieldViolation>) {
        if !self.param_type.matches(value) {
            let message = if self.param_type == ParamType::Integer && value.is_u64() {
                format!("must be less than or equal to {}", i64::MAX)
            } else {
                format!("must be {}", self.param_type.describe())
            };
            violations.push(FieldViolation::new(&self.name, message));
            return;
        }

        // A GID with nothing after the type segment would address the collection.
        if self.param_type == ParamType::Id
            && value
                .as_str()
                .is_some_and(|s| !s.trim().is_empty() && legacy_id(s).is_empty())
        {
            violations.push(FieldViolation::new(&self.name, "is not a valid ID"));
            return;
        }

        for constraint in &self.constraints {
            if let Some(message) = constraint.check(value) {
                violations.push(FieldViolation::new(&self.name, message));
            }
        }

        if let (Some(item_type), Value::Array(items)) = (self.items, value) {
            for (index, item) in items.iter().enumerate() {
                if !item_type.matches(item) {
                    violations.push(FieldViolation::new(
                        format!("{}[{index}]", self.name),
                        format!("must be {}", item_type.describe()),
                    ));
                }
            }
        }
    }

    fn json_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), self.param_type.json_schema_type());
        if !self.description.is_empty() {
            schema.insert("description".to_string(), json!(self.description));
        }
        if let Some(items) = self.items {
            schema.insert(
                "items".to_string(),
                json!({ "type": items.json_schema_type() }),
            );
        }
        for constraint in &self.constraints {
            constraint.apply_to_schema(&mut schema, self.param_type);
        }
        Value::Object(schema)
    }
}

/// What to do with argument fields a tool does not declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownArgumentPolicy {
    /// Report each undeclared field as a violation.
    #[default]
    Reject,
    /// Silently drop undeclared fields.
    Ignore,
}

/// Errors raised while building a definition.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Tool names must be non-empty and free of whitespace.
    #[error("invalid tool name '{0}'")]
    InvalidName(String),
    /// Two parameters share a name.
    #[error("tool '{tool}' declares parameter '{param}' more than once")]
    DuplicateParam {
        /// Tool name.
        tool: String,
        /// Repeated parameter name.
        param: String,
    },
}

/// A declarative, read-only description of one tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    name: String,
    description: String,
    parameters: Vec<ParamSpec>,
}

impl ToolDefinition {
    /// Create a definition with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    /// Append a parameter (builder style).
    #[must_use]
    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn parameters(&self) -> &[ParamSpec] {
        &self.parameters
    }

    /// Check the definition itself is well-formed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains whitespace, or if a
    /// parameter name is repeated.
    pub fn check(&self) -> Result<(), SchemaError> {
        if self.name.is_empty() || self.name.chars().any(char::is_whitespace) {
            return Err(SchemaError::InvalidName(self.name.clone()));
        }
        for (i, spec) in self.parameters.iter().enumerate() {
            if self.parameters[..i].iter().any(|p| p.name == spec.name) {
                return Err(SchemaError::DuplicateParam {
                    tool: self.name.clone(),
                    param: spec.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Render the parameters as a JSON Schema object for `tools/list`.
    #[must_use]
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    /// Validate arguments against the declared parameters.
    ///
    /// A `null` value counts as absent. Every violation is collected; the
    /// order follows the declaration order, then undeclared fields.
    ///
    /// # Errors
    ///
    /// Returns the full list of violations if any parameter is missing,
    /// mistyped, breaks a constraint, or (under [`UnknownArgumentPolicy::Reject`])
    /// is not declared.
    pub fn validate(
        &self,
        arguments: &Map<String, Value>,
        policy: UnknownArgumentPolicy,
    ) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();

        for spec in &self.parameters {
            match arguments.get(&spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        violations.push(FieldViolation::new(&spec.name, "is required"));
                    }
                }
                Some(value) => spec.check(value, &mut violations),
            }
        }

        if policy == UnknownArgumentPolicy::Reject {
            let mut unknown: Vec<&String> = arguments
                .keys()
                .filter(|key| !self.parameters.iter().any(|p| &p.name == *key))
                .collect();
            unknown.sort();
            for key in unknown {
                violations.push(FieldViolation::new(key, "is not a parameter of this tool"));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    /// Drop undeclared fields from `arguments`.
    pub fn retain_declared(&self, arguments: &mut Map<String, Value>) {
        arguments.retain(|key, _| self.parameters.iter().any(|p| &p.name == key));
    }
}

/// One violated field, reported back to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Argument name (array elements as `name[index]`).
    pub field: String,
    /// What is wrong with it.
    pub message: String,
}

impl FieldViolation {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}
