//! Core types for the Shopify Admin MCP server.
//!
//! This module provides type-safe wrappers for the concepts shared between
//! the dispatcher, the Shopify client and the MCP front end.

pub mod credential;
pub mod id;
pub mod invocation;
pub mod tool;

pub use credential::{StoreCredentials, StoreCredentialsError};
pub use id::{ResourceKind, legacy_id, to_gid};
pub use invocation::{
    ErrorKind, InconsistentResult, ToolErrorBody, ToolInvocationRequest, ToolInvocationResult,
};
pub use tool::{
    Constraint, FieldViolation, ParamSpec, ParamType, SchemaError, ToolDefinition,
    UnknownArgumentPolicy,
};
