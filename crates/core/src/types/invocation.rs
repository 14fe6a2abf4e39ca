//! Tool invocation requests and their uniform result envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::tool::FieldViolation;

/// A request to run one tool by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolInvocationRequest {
    /// Case-sensitive tool name.
    pub tool_name: String,
    /// Named arguments; an empty map when the tool takes none.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolInvocationRequest {
    #[must_use]
    pub fn new(tool_name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Build a request from a JSON value; non-object values give no arguments.
    #[must_use]
    pub fn from_value(tool_name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(tool_name, arguments)
    }
}

/// Category of a failed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Arguments did not match the tool's declared parameters.
    #[serde(rename = "ValidationError")]
    Validation,
    /// No tool with the requested name is registered.
    #[serde(rename = "UnknownToolError")]
    UnknownTool,
    /// A tool with the same name was already registered.
    #[serde(rename = "DuplicateNameError")]
    DuplicateName,
    /// The referenced Shopify resource does not exist.
    #[serde(rename = "NotFoundError")]
    NotFound,
    /// The Shopify request failed (status, transport or response body).
    #[serde(rename = "HttpError")]
    Http,
}

impl ErrorKind {
    /// The serialized name, e.g. `"ValidationError"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "ValidationError",
            Self::UnknownTool => "UnknownToolError",
            Self::DuplicateName => "DuplicateNameError",
            Self::NotFound => "NotFoundError",
            Self::Http => "HttpError",
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error carried by a failed [`ToolInvocationResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    /// Upstream HTTP status, when there was one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Per-field details for validation failures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<FieldViolation>>,
}

impl ToolErrorBody {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            violations: None,
        }
    }
}

/// Uniform outcome of every invocation.
///
/// Exactly one of `payload` and `error` is present. The constructors are the
/// only way to build one, and deserializing rejects any other combination.
///
/// ```
/// use serde_json::json;
/// use shopify_admin_mcp_core::{ErrorKind, ToolErrorBody, ToolInvocationResult};
///
/// let ok = ToolInvocationResult::success(json!({"id": 1}));
/// assert!(ok.is_success());
/// assert!(ok.error().is_none());
///
/// let err = ToolInvocationResult::failure(ToolErrorBody::new(ErrorKind::NotFound, "gone"));
/// assert!(!err.is_success());
/// assert!(err.payload().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireResult", try_from = "WireResult")]
pub struct ToolInvocationResult {
    outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Success(Value),
    Failure(ToolErrorBody),
}

/// `{success, payload?, error?}` as it appears on the wire.
#[derive(Serialize, Deserialize)]
struct WireResult {
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<ToolErrorBody>,
}

impl From<ToolInvocationResult> for WireResult {
    fn from(result: ToolInvocationResult) -> Self {
        match result.outcome {
            Outcome::Success(payload) => Self {
                success: true,
                payload: Some(payload),
                error: None,
            },
            Outcome::Failure(error) => Self {
                success: false,
                payload: None,
                error: Some(error),
            },
        }
    }
}

/// A serialized result whose fields contradict each other.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InconsistentResult {
    #[error("a successful result must not carry an error")]
    SuccessWithError,
    #[error("a failed result must not carry a payload")]
    FailureWithPayload,
    #[error("a failed result must carry an error")]
    FailureWithoutError,
}

impl TryFrom<WireResult> for ToolInvocationResult {
    type Error = InconsistentResult;

    fn try_from(wire: WireResult) -> Result<Self, Self::Error> {
        match (wire.success, wire.payload, wire.error) {
            // `"payload": null` reads back as `None`.
            (true, payload, None) => Ok(Self::success(payload.unwrap_or(Value::Null))),
            (true, _, Some(_)) => Err(InconsistentResult::SuccessWithError),
            (false, Some(_), _) => Err(InconsistentResult::FailureWithPayload),
            (false, None, Some(error)) => Ok(Self::failure(error)),
            (false, None, None) => Err(InconsistentResult::FailureWithoutError),
        }
    }
}

impl ToolInvocationResult {
    #[must_use]
    pub const fn success(payload: Value) -> Self {
        Self {
            outcome: Outcome::Success(payload),
        }
    }

    #[must_use]
    pub const fn failure(error: ToolErrorBody) -> Self {
        Self {
            outcome: Outcome::Failure(error),
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    #[must_use]
    pub const fn payload(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Success(payload) => Some(payload),
            Outcome::Failure(_) => None,
        }
    }

    #[must_use]
    pub const fn error(&self) -> Option<&ToolErrorBody> {
        match &self.outcome {
            Outcome::Success(_) => None,
            Outcome::Failure(error) => Some(error),
        }
    }

    /// Kind of the error, if this is a failure.
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error().map(|e| e.kind)
    }

    /// Consume the result, yielding the payload or the error body.
    ///
    /// # Errors
    ///
    /// Returns the error body for a failed invocation.
    pub fn into_result(self) -> Result<Value, ToolErrorBody> {
        match self.outcome {
            Outcome::Success(payload) => Ok(payload),
            Outcome::Failure(error) => Err(error),
        }
    }
}
