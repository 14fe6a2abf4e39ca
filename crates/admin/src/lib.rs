//! Shopify Admin MCP server library.
//!
//! Exposes a Shopify store's Admin API as a catalogue of named tools that an
//! AI agent can call over the Model Context Protocol. Each tool validates its
//! JSON arguments against a declared schema, runs one or more REST or GraphQL
//! requests and returns a uniform success/failure result.
//!
//! # Security
//!
//! This crate holds a HIGH PRIVILEGE Admin API access token that can modify
//! products, inventory, content, customers and discounts. Only run it for
//! agents you trust with that access.
//!
//! # Modules
//!
//! - [`config`]: environment configuration
//! - [`shopify`]: Admin API client over a pluggable transport
//! - [`tools`]: tool catalogue and the registry that validates and dispatches calls
//! - [`mcp`]: `rmcp` server handler served on stdio

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod mcp;
pub mod shopify;
pub mod tools;

pub use error::ToolError;
pub use mcp::{McpServer, ServeError};
pub use tools::ToolRegistry;
