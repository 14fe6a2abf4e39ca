//! Shopify Admin MCP server.
//!
//! Speaks MCP over stdin/stdout through `rmcp`. Logs go to stderr so they
//! never corrupt the protocol stream.
//!
//! # Security
//!
//! Carries a HIGH PRIVILEGE Shopify Admin API token. The token is read from
//! the environment (or `.env`) and never logged.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sentry::integrations::tracing as sentry_tracing;
use shopify_admin_mcp::config::{LogFormat, ServerConfig};
use shopify_admin_mcp::shopify::{AdminClient, ReqwestTransport};
use shopify_admin_mcp::{McpServer, ToolRegistry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            // Tool arguments can carry customer data
            send_default_pii: false,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the environment may already be set
    let _ = dotenvy::dotenv();

    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopify_admin_mcp=info".into());

    // stdout is the protocol channel, so every layer writes to stderr
    let json = config.log_format == LogFormat::Json;
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(std::io::stderr)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let transport =
        ReqwestTransport::new(config.http_timeout).expect("Failed to build HTTP client");
    let client = AdminClient::new(config.credentials.clone(), Arc::new(transport))
        .expect("Failed to build Shopify client");
    let registry = ToolRegistry::with_shopify_tools(client, config.unknown_arguments)
        .expect("Failed to register tools");

    tracing::info!(
        store = %config.credentials.domain(),
        api_version = %config.credentials.api_version(),
        tools = registry.len(),
        "Shopify Admin MCP server starting"
    );

    if let Err(err) = McpServer::new(Arc::new(registry)).run_stdio().await {
        tracing::error!(error = %err, "MCP server stopped");
        std::process::exit(1);
    }
}
