//! Shopify Admin API client over REST and GraphQL.
//!
//! Responses are returned as loosely typed JSON; callers pass them through to
//! the agent unchanged.

use std::sync::Arc;
use std::time::Instant;

use graphql_client::{QueryBody, Response};
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use shopify_admin_mcp_core::StoreCredentials;
use tracing::instrument;
use url::Url;

use super::transport::{HttpRequest, HttpResponse, Transport};
use super::{AdminShopifyError, graphql_error};

const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Shopify Admin API client.
///
/// Cheap to clone; every clone shares the same credentials and transport.
///
/// # Security
///
/// Holds the HIGH PRIVILEGE Admin API access token.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    transport: Arc<dyn Transport>,
    credentials: StoreCredentials,
    /// `https://{store}/admin/api/{version}/`
    base_url: Url,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("credentials", &self.inner.credentials)
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Url` if the store domain and API version do
    /// not form a valid base URL.
    pub fn new(
        credentials: StoreCredentials,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, AdminShopifyError> {
        let base_url = Url::parse(&format!(
            "https://{}/admin/api/{}/",
            credentials.domain(),
            credentials.api_version()
        ))?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                transport,
                credentials,
                base_url,
            }),
        })
    }

    /// Get the store domain.
    #[must_use]
    pub fn store(&self) -> &str {
        self.inner.credentials.domain()
    }

    /// Get the Admin API version.
    #[must_use]
    pub fn api_version(&self) -> &str {
        self.inner.credentials.api_version()
    }

    /// Build the URL of a REST resource, e.g. `products/123` ->
    /// `https://{store}/admin/api/{version}/products/123.json`.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Url` if the path does not form a valid URL.
    pub fn rest_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, AdminShopifyError> {
        let mut url = self
            .inner
            .base_url
            .join(&format!("{}.json", path.trim_matches('/')))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// The GraphQL endpoint URL.
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Url` if the base URL cannot be joined.
    pub fn graphql_url(&self) -> Result<Url, AdminShopifyError> {
        Ok(self.inner.base_url.join("graphql.json")?)
    }

    fn headers(&self, has_body: bool) -> Result<HeaderMap, AdminShopifyError> {
        let mut token =
            HeaderValue::from_str(self.inner.credentials.access_token().expose_secret())
                .map_err(|_| {
                    AdminShopifyError::Unauthorized(
                        "access token contains characters not allowed in a header".to_string(),
                    )
                })?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(headers)
    }

    // =========================================================================
    // REST
    // =========================================================================

    /// Call a REST endpoint and return the parsed body.
    ///
    /// # Arguments
    ///
    /// * `path` - Resource path without the version prefix or `.json`, e.g. `orders/1001`
    /// * `query` - Query-string pairs
    /// * `body` - Optional JSON body
    ///
    /// # Errors
    ///
    /// Returns `NotFound` on 404, `Unauthorized`/`Forbidden` on 401/403,
    /// `RateLimited` on 429, `Status` on any other non-2xx status, `Parse` if
    /// a 2xx body is not JSON and `Transport` if no response was received.
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn rest(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<Value>,
    ) -> Result<Value, AdminShopifyError> {
        let request = HttpRequest {
            method,
            url: self.rest_url(path, query)?,
            headers: self.headers(body.is_some())?,
            body,
        };
        self.dispatch(request, path).await
    }

    // =========================================================================
    // GraphQL
    // =========================================================================

    /// Execute a GraphQL document and return its `data` member.
    ///
    /// # Errors
    ///
    /// Returns `GraphQL` if the response carries top-level `errors` or no
    /// `data`, plus every error [`rest`](Self::rest) can return.
    #[instrument(skip_all, fields(operation = %operation_name))]
    pub async fn graphql(
        &self,
        query: &'static str,
        operation_name: &'static str,
        variables: Value,
    ) -> Result<Value, AdminShopifyError> {
        let body = QueryBody {
            variables,
            query,
            operation_name,
        };
        let request = HttpRequest {
            method: Method::POST,
            url: self.graphql_url()?,
            headers: self.headers(true)?,
            body: Some(serde_json::to_value(&body)?),
        };

        let value = self.dispatch(request, "graphql").await?;
        let response: Response<Value> = serde_json::from_value(value)?;

        if let Some(errors) = response.errors
            && !errors.is_empty()
        {
            return Err(AdminShopifyError::GraphQL(errors));
        }

        match response.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(AdminShopifyError::GraphQL(vec![graphql_error(
                "No data in response",
            )])),
        }
    }

    async fn dispatch(&self, request: HttpRequest, path: &str) -> Result<Value, AdminShopifyError> {
        let method = request.method.clone();
        let started = Instant::now();

        let response = match self.inner.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%method, path, error = %e, "Shopify request failed");
                return Err(e.into());
            }
        };

        tracing::debug!(
            %method,
            path,
            status = response.status,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Shopify request completed"
        );

        interpret(response, path)
    }
}

/// Map a raw response onto parsed JSON or a typed error.
fn interpret(response: HttpResponse, path: &str) -> Result<Value, AdminShopifyError> {
    match response.status {
        200..=299 => {
            if response.body.trim().is_empty() {
                Ok(json!({}))
            } else {
                Ok(serde_json::from_str(&response.body)?)
            }
        }
        404 => Err(AdminShopifyError::NotFound(path.to_string())),
        401 => Err(AdminShopifyError::Unauthorized(
            "Invalid or expired access token".to_string(),
        )),
        403 => Err(AdminShopifyError::Forbidden(
            "Access token lacks the required scope".to_string(),
        )),
        429 => Err(AdminShopifyError::RateLimited(
            response.retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
        )),
        status => Err(AdminShopifyError::Status {
            status,
            body: response.body,
        }),
    }
}

/// Extract a mutation payload from GraphQL `data`, failing on `userErrors`.
///
/// The payload object is returned unchanged, `userErrors` included.
///
/// # Errors
///
/// Returns `UserError` listing every user error, or `GraphQL` if the field is
/// missing from `data`.
pub fn mutation_payload(mut data: Value, field: &str) -> Result<Value, AdminShopifyError> {
    let payload = data
        .get_mut(field)
        .map(Value::take)
        .filter(|v| !v.is_null())
        .ok_or_else(|| {
            AdminShopifyError::GraphQL(vec![graphql_error(format!("No {field} in response"))])
        })?;

    if let Some(errors) = payload.get("userErrors").and_then(Value::as_array)
        && !errors.is_empty()
    {
        let messages: Vec<String> = errors
            .iter()
            .map(|e| {
                let message = e.get("message").and_then(Value::as_str).unwrap_or("unknown error");
                match e.get("field").and_then(Value::as_array) {
                    Some(path) if !path.is_empty() => {
                        let field = path
                            .iter()
                            .map(|p| p.as_str().map_or_else(|| p.to_string(), str::to_string))
                            .collect::<Vec<_>>()
                            .join(".");
                        format!("{field}: {message}")
                    }
                    _ => message.to_string(),
                }
            })
            .collect();
        return Err(AdminShopifyError::UserError(messages.join("; ")));
    }

    Ok(payload)
}

/// Return GraphQL `data` unchanged, or `NotFound` if `data[field]` is null.
///
/// # Errors
///
/// Returns `NotFound` naming `id` when the resource does not exist.
pub fn required_node(data: Value, field: &str, id: &str) -> Result<Value, AdminShopifyError> {
    if data.get(field).is_none_or(Value::is_null) {
        return Err(AdminShopifyError::NotFound(format!("{field} {id}")));
    }
    Ok(data)
}
