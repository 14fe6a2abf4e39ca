//! Shopify tools organized by domain, and the registry that dispatches them.
//!
//! Each domain module declares its tools (`*_tool()` definitions) and the
//! async operations behind them, then registers both through `register`.
//!
//! **Read tools (22):** store info, locations, publications, menus, products,
//! publication status, inventory items, blogs, articles, pages, customers,
//! orders, discounts.
//!
//! **Write tools (19):** product, variant, inventory, menu, blog, article,
//! page, customer invite and discount mutations.
//!
//! The registry is populated once at startup and then shared read-only.

use std::collections::HashMap;
use std::time::Instant;

use futures::future::BoxFuture;
use serde_json::Value;
use shopify_admin_mcp_core::{
    FieldViolation, ParamSpec, ToolDefinition, ToolInvocationRequest, ToolInvocationResult,
    UnknownArgumentPolicy, legacy_id,
};
use tracing::instrument;

use crate::error::ToolError;
use crate::shopify::AdminClient;

pub use args::Arguments;

/// Future returned by every tool handler.
pub type ToolFuture = BoxFuture<'static, Result<Value, ToolError>>;

/// A tool handler: owns a client handle and the validated arguments.
pub type ToolHandler = fn(AdminClient, Arguments) -> ToolFuture;

/// Cross-field checks a schema cannot express. Runs on the raw arguments
/// next to schema validation, so it must tolerate missing or mistyped fields.
pub type ArgumentCheck = fn(&Arguments) -> Vec<FieldViolation>;

/// Wrap `async fn op(&AdminClient, &Arguments)` as a [`ToolHandler`].
macro_rules! handler {
    ($op:path) => {
        |client: $crate::shopify::AdminClient,
         args: $crate::tools::Arguments|
         -> $crate::tools::ToolFuture { Box::pin(async move { $op(&client, &args).await }) }
    };
}

pub mod args;
mod articles;
mod blogs;
mod customers;
mod discounts;
mod inventory;
mod navigation;
mod orders;
mod pages;
mod products;
mod store;
mod variants;

/// Number of tools registered by [`ToolRegistry::with_shopify_tools`].
pub const SHOPIFY_TOOL_COUNT: usize = 41;

struct RegisteredTool {
    definition: ToolDefinition,
    check: Option<ArgumentCheck>,
    handler: ToolHandler,
}

/// Name -> (definition, handler) map with schema validation.
pub struct ToolRegistry {
    client: AdminClient,
    tools: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
    policy: UnknownArgumentPolicy,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("client", &self.client)
            .field("tools", &self.tools.len())
            .field("policy", &self.policy)
            .finish()
    }
}

impl ToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(client: AdminClient, policy: UnknownArgumentPolicy) -> Self {
        Self {
            client,
            tools: Vec::new(),
            index: HashMap::new(),
            policy,
        }
    }

    /// Create a registry holding every Shopify tool.
    ///
    /// # Errors
    ///
    /// Returns an error if two tools share a name or a definition is malformed.
    pub fn with_shopify_tools(
        client: AdminClient,
        policy: UnknownArgumentPolicy,
    ) -> Result<Self, ToolError> {
        let mut registry = Self::new(client, policy);
        store::register(&mut registry)?;
        navigation::register(&mut registry)?;
        products::register(&mut registry)?;
        variants::register(&mut registry)?;
        inventory::register(&mut registry)?;
        blogs::register(&mut registry)?;
        articles::register(&mut registry)?;
        pages::register(&mut registry)?;
        customers::register(&mut registry)?;
        orders::register(&mut registry)?;
        discounts::register(&mut registry)?;
        tracing::debug!(tools = registry.len(), "Tool registry populated");
        Ok(registry)
    }

    /// Register a tool.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` if the name is taken, or `InvalidDefinition`
    /// if the definition is malformed. The registry is unchanged on error.
    pub fn register(
        &mut self,
        definition: ToolDefinition,
        handler: ToolHandler,
    ) -> Result<(), ToolError> {
        self.insert(definition, None, handler)
    }

    /// Register a tool whose arguments also go through `check` before dispatch.
    ///
    /// # Errors
    ///
    /// See [`ToolRegistry::register`].
    pub fn register_checked(
        &mut self,
        definition: ToolDefinition,
        check: ArgumentCheck,
        handler: ToolHandler,
    ) -> Result<(), ToolError> {
        self.insert(definition, Some(check), handler)
    }

    fn insert(
        &mut self,
        definition: ToolDefinition,
        check: Option<ArgumentCheck>,
        handler: ToolHandler,
    ) -> Result<(), ToolError> {
        definition.check()?;
        if self.index.contains_key(definition.name()) {
            return Err(ToolError::DuplicateName(definition.name().to_string()));
        }
        self.index
            .insert(definition.name().to_string(), self.tools.len());
        self.tools.push(RegisteredTool {
            definition,
            check,
            handler,
        });
        Ok(())
    }

    /// Every definition, in registration order.
    pub fn list_tools(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter().map(|t| &t.definition)
    }

    /// Look up a definition by (case-sensitive) name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.lookup(name).map(|t| &t.definition)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    #[must_use]
    pub const fn policy(&self) -> UnknownArgumentPolicy {
        self.policy
    }

    fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.index.get(name).and_then(|&i| self.tools.get(i))
    }

    /// Look up, validate and run a tool.
    ///
    /// Never fails: every error becomes a failed [`ToolInvocationResult`].
    #[instrument(skip_all, fields(tool = %request.tool_name))]
    pub async fn invoke(&self, request: ToolInvocationRequest) -> ToolInvocationResult {
        let started = Instant::now();
        let outcome = self.dispatch(request).await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        match outcome {
            Ok(payload) => {
                tracing::info!(elapsed_ms, "Tool succeeded");
                ToolInvocationResult::success(payload)
            }
            Err(err) => {
                if err.is_server_failure() {
                    let event_id = sentry::capture_error(&err);
                    tracing::error!(
                        error = %err,
                        sentry_event_id = %event_id,
                        elapsed_ms,
                        "Tool failed upstream"
                    );
                } else {
                    tracing::warn!(error = %err, kind = %err.kind(), elapsed_ms, "Tool failed");
                }
                ToolInvocationResult::failure(err.to_body())
            }
        }
    }

    async fn dispatch(&self, request: ToolInvocationRequest) -> Result<Value, ToolError> {
        let ToolInvocationRequest {
            tool_name,
            arguments,
        } = request;

        let tool = self
            .lookup(&tool_name)
            .ok_or(ToolError::UnknownTool(tool_name))?;

        let mut arguments = Arguments::new(arguments);
        let mut violations = tool
            .definition
            .validate(arguments.as_map(), self.policy)
            .err()
            .unwrap_or_default();
        if let Some(check) = tool.check {
            for violation in check(&arguments) {
                if !violations.contains(&violation) {
                    violations.push(violation);
                }
            }
        }
        if !violations.is_empty() {
            return Err(ToolError::Validation(violations));
        }

        if self.policy == UnknownArgumentPolicy::Ignore {
            tool.definition.retain_declared(arguments.as_map_mut());
        }

        (tool.handler)(self.client.clone(), arguments).await
    }
}

// =============================================================================
// Shared parameters
// =============================================================================

/// Page size for GraphQL connections.
fn first_param(default: i64) -> ParamSpec {
    ParamSpec::integer("first")
        .min(1.0)
        .max(250.0)
        .describe(format!("Number of results to return (1-250, default {default})"))
}

/// Pagination cursor from a previous page's `pageInfo.endCursor`.
fn after_param() -> ParamSpec {
    ParamSpec::string("after").describe("Cursor to continue from (pageInfo.endCursor)")
}

/// Shopify search syntax filter.
fn query_param(example: &str) -> ParamSpec {
    ParamSpec::string("query").describe(format!(
        "Filter using Shopify search syntax (e.g. {example})"
    ))
}

/// A REST path segment from a numeric ID or GID.
fn rest_id(raw: &str) -> String {
    urlencoding::encode(legacy_id(raw)).into_owned()
}

/// A violation on `anchor` unless at least one of `fields` is present.
fn require_any(args: &Arguments, anchor: &str, fields: &[&str]) -> Vec<FieldViolation> {
    if args.has_any(fields) {
        return Vec::new();
    }
    let listed = match fields.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{} or {last}", rest.join(", ")),
        _ => fields.join(""),
    };
    vec![FieldViolation::new(
        anchor,
        format!("at least one of {listed} must be provided"),
    )]
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;
    use shopify_admin_mcp_core::{ErrorKind, StoreCredentials};

    use super::*;
    use crate::shopify::{HttpRequest, HttpResponse, Transport, TransportError};

    #[derive(Default)]
    struct CountingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(HttpResponse::json(&json!({"shop": {"name": "Demo"}})))
        }
    }

    fn registry(policy: UnknownArgumentPolicy) -> (ToolRegistry, Arc<CountingTransport>) {
        let transport = Arc::new(CountingTransport::default());
        let credentials =
            StoreCredentials::new("demo.myshopify.com", "shpat_test", "2025-07").unwrap();
        let client = AdminClient::new(credentials, transport.clone()).unwrap();
        (
            ToolRegistry::with_shopify_tools(client, policy).unwrap(),
            transport,
        )
    }

    async fn echo(_client: &AdminClient, args: &Arguments) -> Result<Value, ToolError> {
        Ok(Value::Object(args.as_map().clone()))
    }

    #[test]
    fn test_all_tools_registered_once() {
        let (registry, _) = registry(UnknownArgumentPolicy::Reject);
        assert_eq!(registry.len(), SHOPIFY_TOOL_COUNT);

        let names: HashSet<&str> = registry.list_tools().map(ToolDefinition::name).collect();
        assert_eq!(names.len(), SHOPIFY_TOOL_COUNT);
        assert_eq!(
            registry.list_tools().next().map(ToolDefinition::name),
            Some("getStoreInfo")
        );
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let (mut registry, _) = registry(UnknownArgumentPolicy::Reject);
        let err = registry
            .register(ToolDefinition::new("getProduct", "again"), handler!(echo))
            .unwrap_err();
        assert!(matches!(err, ToolError::DuplicateName(name) if name == "getProduct"));
        assert_eq!(registry.len(), SHOPIFY_TOOL_COUNT);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let (registry, _) = registry(UnknownArgumentPolicy::Reject);
        assert!(registry.get("getOrder").is_some());
        assert!(registry.get("getorder").is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool_makes_no_calls() {
        let (registry, transport) = registry(UnknownArgumentPolicy::Reject);
        let result = registry
            .invoke(ToolInvocationRequest::new("getWidgets", serde_json::Map::new()))
            .await;
        assert_eq!(result.error_kind(), Some(ErrorKind::UnknownTool));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ignore_policy_drops_unknown_fields() {
        let (mut registry, _) = registry(UnknownArgumentPolicy::Ignore);
        registry
            .register(
                ToolDefinition::new("echo", "").param(ParamSpec::string("keep")),
                handler!(echo),
            )
            .unwrap();

        let request = ToolInvocationRequest::from_value("echo", json!({"keep": "a", "drop": 1}));
        let result = registry.invoke(request).await;
        assert_eq!(result.payload(), Some(&json!({"keep": "a"})));
    }

    fn reject_shouting(args: &Arguments) -> Vec<FieldViolation> {
        match args.opt_str("keep") {
            Some(keep) if keep.chars().all(char::is_uppercase) => {
                vec![FieldViolation::new("keep", "must not be all caps")]
            }
            _ => Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_check_violations_merge_with_schema_violations() {
        let (mut registry, transport) = registry(UnknownArgumentPolicy::Reject);
        registry
            .register_checked(
                ToolDefinition::new("echo", "")
                    .param(ParamSpec::string("keep"))
                    .param(ParamSpec::id("id").required()),
                reject_shouting,
                handler!(echo),
            )
            .unwrap();

        let result = registry
            .invoke(ToolInvocationRequest::from_value("echo", json!({"keep": "LOUD"})))
            .await;
        let fields: Vec<&str> = result
            .error()
            .and_then(|e| e.violations.as_ref())
            .unwrap()
            .iter()
            .map(|v| v.field.as_str())
            .collect();
        assert_eq!(fields, vec!["id", "keep"]);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_require_any_lists_fields() {
        let args = Arguments::new(serde_json::Map::new());
        assert_eq!(
            require_any(&args, "pageId", &["title", "body"]),
            vec![FieldViolation::new(
                "pageId",
                "at least one of title or body must be provided"
            )]
        );
        assert_eq!(
            require_any(&args, "productId", &["title", "vendor", "tags"])[0].message,
            "at least one of title, vendor or tags must be provided"
        );
        let args = Arguments::new(json!({"body": "x"}).as_object().cloned().unwrap());
        assert!(require_any(&args, "pageId", &["title", "body"]).is_empty());
    }

    #[test]
    fn test_rest_id() {
        assert_eq!(rest_id("gid://shopify/Order/1001"), "1001");
        assert_eq!(rest_id("a/b"), "a%2Fb");
    }

    #[tokio::test]
    async fn test_success_passes_payload_through() {
        let (registry, transport) = registry(UnknownArgumentPolicy::Reject);
        let result = registry
            .invoke(ToolInvocationRequest::new("getStoreInfo", serde_json::Map::new()))
            .await;
        assert!(result.is_success());
        assert_eq!(result.payload(), Some(&json!({"shop": {"name": "Demo"}})));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }
}
