//! Shopify Admin MCP Core - Shared types library.
//!
//! This crate provides the types shared by the tool server and its tests:
//! - store credentials handed to the Shopify client at startup
//! - Shopify ID helpers (numeric IDs and GIDs)
//! - the declarative tool schema model and argument validation
//! - the invocation request/result wire types
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Credentials, IDs, tool definitions and invocation envelopes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
