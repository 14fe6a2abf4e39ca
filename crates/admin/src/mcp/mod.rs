//! MCP front end: serves the tool registry over stdio with `rmcp`.
//!
//! stdout carries protocol messages only; logging goes to stderr. `rmcp` owns
//! JSON-RPC framing, the `initialize` handshake and protocol-level errors;
//! this module maps `tools/list` and `tools/call` onto the [`ToolRegistry`].

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorData, Implementation, JsonObject,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::stdio;
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use serde_json::Value;
use shopify_admin_mcp_core::{ToolDefinition, ToolInvocationRequest};
use thiserror::Error;
use tracing::instrument;

use crate::tools::ToolRegistry;

const SERVER_NAME: &str = "shopify-admin-mcp";

const INSTRUCTIONS: &str = "Tools for managing one Shopify store through the Admin API. \
IDs may be given as numeric IDs or gid://shopify/... GIDs. List tools accept `first` \
(1-250), `after` (a previous pageInfo.endCursor) and `query` (Shopify search syntax). \
Every call returns {success, payload} or {success: false, error: {kind, message}}.";

/// Errors that end an MCP session abnormally.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("MCP handshake failed: {0}")]
    Initialize(String),
    #[error("MCP service task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Serves a [`ToolRegistry`] to an MCP client.
#[derive(Debug, Clone)]
pub struct McpServer {
    registry: Arc<ToolRegistry>,
}

impl McpServer {
    #[must_use]
    pub const fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Serve until the client disconnects or stdin closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake fails or the service task panics.
    pub async fn run_stdio(self) -> Result<(), ServeError> {
        tracing::info!(
            tools = self.registry.len(),
            "MCP server listening on stdio"
        );

        let service = self
            .serve(stdio())
            .await
            .map_err(|e| ServeError::Initialize(e.to_string()))?;
        let reason = service.waiting().await?;

        tracing::info!(?reason, "MCP session ended");
        Ok(())
    }

    /// Every registered tool as an MCP descriptor, in registration order.
    #[must_use]
    pub fn mcp_tools(&self) -> Vec<Tool> {
        self.registry.list_tools().map(to_mcp_tool).collect()
    }

    /// Run one `tools/call`.
    ///
    /// Tool failures are results with `isError` set, never protocol errors.
    /// The invocation envelope is returned both as `structuredContent` and as
    /// its JSON text.
    #[instrument(skip_all, fields(tool = %params.name))]
    pub async fn call(&self, params: CallToolRequestParam) -> CallToolResult {
        let request = ToolInvocationRequest::new(
            params.name.into_owned(),
            params.arguments.unwrap_or_default(),
        );
        let result = self.registry.invoke(request).await;
        let success = result.is_success();

        match serde_json::to_value(&result) {
            Ok(structured) if success => CallToolResult::structured(structured),
            Ok(structured) => CallToolResult::structured_error(structured),
            Err(err) => CallToolResult::error(vec![Content::text(format!(
                "failed to encode tool result: {err}"
            ))]),
        }
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult::with_all_items(self.mcp_tools()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        Ok(self.call(request).await)
    }
}

fn to_mcp_tool(definition: &ToolDefinition) -> Tool {
    let schema = match definition.input_schema() {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    Tool::new(
        definition.name().to_string(),
        definition.description().to_string(),
        Arc::new(schema),
    )
}
