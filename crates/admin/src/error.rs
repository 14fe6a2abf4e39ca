//! Unified error handling for tool invocations.

use shopify_admin_mcp_core::{ErrorKind, FieldViolation, SchemaError, ToolErrorBody};
use thiserror::Error;

use crate::shopify::AdminShopifyError;

/// Error raised while registering or invoking a tool.
///
/// Every variant maps onto exactly one [`ErrorKind`] and is turned into a
/// failed `ToolInvocationResult` at the dispatcher boundary.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments failed schema or operation-specific validation.
    #[error("invalid arguments: {}", format_violations(.0))]
    Validation(Vec<FieldViolation>),

    /// No tool with this name is registered.
    #[error("unknown tool '{0}'")]
    UnknownTool(String),

    /// A tool with this name is already registered.
    #[error("tool '{0}' is already registered")]
    DuplicateName(String),

    /// A tool definition is malformed.
    #[error("invalid tool definition: {0}")]
    InvalidDefinition(#[from] SchemaError),

    /// The referenced Shopify resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The Shopify request failed.
    #[error("{message}")]
    Http {
        /// Upstream HTTP status, if a response was received.
        status: Option<u16>,
        /// Human-readable description.
        message: String,
    },
}

impl ToolError {
    /// A single-field validation failure.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldViolation::new(field, message)])
    }

    /// The category reported to the agent.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::InvalidDefinition(_) => ErrorKind::Validation,
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::DuplicateName(_) => ErrorKind::DuplicateName,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Http { .. } => ErrorKind::Http,
        }
    }

    /// Upstream HTTP status, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound(_) => Some(404),
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }

    /// Whether Shopify itself failed (5xx), as opposed to rejecting the request.
    #[must_use]
    pub const fn is_server_failure(&self) -> bool {
        matches!(self, Self::Http { status: Some(s), .. } if *s >= 500)
    }

    /// Render as the wire error body.
    #[must_use]
    pub fn to_body(&self) -> ToolErrorBody {
        let mut body = ToolErrorBody::new(self.kind(), self.to_string());
        body.status_code = self.status();
        if let Self::Validation(violations) = self {
            body.violations = Some(violations.clone());
        }
        body
    }
}

impl From<AdminShopifyError> for ToolError {
    fn from(err: AdminShopifyError) -> Self {
        match err {
            AdminShopifyError::NotFound(what) => Self::NotFound(what),
            other => Self::Http {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

fn format_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shopify::TransportError;

    #[test]
    fn test_validation_message_names_fields() {
        let err = ToolError::Validation(vec![
            FieldViolation::new("quantity", "must be greater than or equal to 0"),
            FieldViolation::new("itemId", "is required"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid arguments: quantity must be greater than or equal to 0; itemId is required"
        );

        let body = err.to_body();
        assert_eq!(body.kind, ErrorKind::Validation);
        assert_eq!(body.violations.map(|v| v.len()), Some(2));
        assert_eq!(body.status_code, None);
    }

    #[test]
    fn test_from_admin_error() {
        let err = ToolError::from(AdminShopifyError::NotFound("orders/1".to_string()));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_body().status_code, Some(404));

        let err = ToolError::from(AdminShopifyError::Status {
            status: 500,
            body: "boom".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.status(), Some(500));
        assert!(err.is_server_failure());

        let err = ToolError::from(AdminShopifyError::Transport(TransportError::Timeout));
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.status(), None);
        assert!(!err.is_server_failure());

        let err = ToolError::from(AdminShopifyError::UserError("title: blank".to_string()));
        assert_eq!(err.to_string(), "User error: title: blank");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            ToolError::UnknownTool("x".into()).kind(),
            ErrorKind::UnknownTool
        );
        assert_eq!(
            ToolError::DuplicateName("x".into()).kind(),
            ErrorKind::DuplicateName
        );
        assert_eq!(
            ToolError::InvalidDefinition(SchemaError::InvalidName(String::new())).kind(),
            ErrorKind::Validation
        );
    }
}
