//! multimcp HTTP server binary.
//!
//! Starts the capability server with in-memory storage. Production
//! deployments swap in a persistent `Storage` implementation; this binary
//! exists for development and integration testing.
//!
//! # Environment Variables
//!
//! - `PORT` — HTTP port (default: 8080)
//! - `MCP_DEV_API_KEY` — If set, seeds a dev tenant reachable with this key,
//!   with every builtin capability enabled
//! - `TOOL_MAX_WORKERS` / `TOOL_QUEUE_SIZE` — Execution queue sizing
//! - `TOOL_ADMISSION_TIMEOUT` / `TOOL_EXECUTION_TIMEOUT` — Queue timeouts (seconds)
//! - `CONFIG_CACHE_TTL` — Config cache TTL (seconds)
//! - `RUST_LOG` — Tracing filter (default: "info,multimcp=debug")
//!
//! # Usage
//!
//! ```bash
//! MCP_DEV_API_KEY=dev-key cargo run --bin server
//! ```

use std::sync::Arc;

use serde_json::json;

use multimcp::config::ServerConfig;
use multimcp::server::{app_router, AppState};
use multimcp::{AppContext, MemoryStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,multimcp=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let bind_addr = format!("0.0.0.0:{}", config.port);

    let storage = Arc::new(MemoryStorage::new());
    if let Ok(key) = std::env::var("MCP_DEV_API_KEY") {
        seed_dev_tenant(&storage, &key);
    } else {
        tracing::warn!("MCP_DEV_API_KEY not set; no tenant can authenticate");
    }

    let ctx = AppContext::new(config, storage);
    ctx.start().await;

    let app = app_router(AppState::new(ctx));

    tracing::info!("multimcp server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health       — liveness probe");
    tracing::info!("  GET  /mcp/{{token}}  — capability discovery");
    tracing::info!("  POST /mcp/{{token}}  — JSON-RPC request unit");

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Create a dev tenant with every builtin capability enabled.
fn seed_dev_tenant(storage: &MemoryStorage, key: &str) {
    let tenant = storage.add_tenant("dev", key);
    storage.enable_tool(tenant.id, "core/echo", json!({}));
    storage.enable_tool(tenant.id, "core/calculator", json!({}));
    storage.enable_resource(
        tenant.id,
        "core/docs",
        json!({
            "entries": [{
                "id": "welcome",
                "name": "Welcome",
                "text": "multimcp dev tenant is up.",
            }]
        }),
    );
    tracing::info!("seeded dev tenant '{}' ({})", tenant.name, tenant.id);
}
