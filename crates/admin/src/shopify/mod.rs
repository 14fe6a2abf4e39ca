//! Shopify Admin API client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! The client carries the store's Admin API access token, which grants write
//! access to products, inventory, content, customers, orders and discounts.
//! The token is held in a [`secrecy::SecretString`], marked sensitive on every
//! request and never logged.
//!
//! # Architecture
//!
//! - REST calls go to `https://{store}/admin/api/{version}/{path}.json`
//! - GraphQL calls go to `https://{store}/admin/api/{version}/graphql.json`,
//!   using `graphql_client` envelope types for the request and response
//! - Requests are sent through a pluggable [`Transport`]
//! - No retries: rate limiting surfaces as [`AdminShopifyError::RateLimited`]
//!
//! # Example
//!
//! ```rust,ignore
//! use shopify_admin_mcp::shopify::{AdminClient, ReqwestTransport};
//!
//! let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(30))?);
//! let client = AdminClient::new(credentials, transport)?;
//!
//! let shop = client.rest(Method::GET, "shop", &[], None).await?;
//! let data = client.graphql(GET_LOCATIONS, "GetLocations", json!({"first": 10})).await?;
//! ```

mod admin;
mod transport;

pub use admin::{AdminClient, mutation_payload, required_node};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

use thiserror::Error;

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// The request never produced an HTTP response.
    #[error("HTTP error: {0}")]
    Transport(#[from] TransportError),

    /// Shopify answered with an unexpected status.
    #[error("Shopify returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<graphql_client::Error>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The access token was rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The access token lacks a required scope.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// User error from mutation (e.g., invalid input).
    #[error("User error: {0}")]
    UserError(String),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl AdminShopifyError {
    /// HTTP status of the upstream response, when one was received.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::NotFound(_) => Some(404),
            Self::RateLimited(_) => Some(429),
            Self::Unauthorized(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::Transport(_)
            | Self::GraphQL(_)
            | Self::Parse(_)
            | Self::UserError(_)
            | Self::Url(_) => None,
        }
    }
}

fn format_graphql_errors(errors: &[graphql_client::Error]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Build a single GraphQL error with no location information.
pub(crate) fn graphql_error(message: impl Into<String>) -> graphql_client::Error {
    graphql_client::Error {
        message: message.into(),
        locations: None,
        path: None,
        extensions: None,
    }
}
