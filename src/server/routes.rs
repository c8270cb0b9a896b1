//! Axum route handlers for the capability server.
//!
//! # Routes
//!
//! - `GET  /health`       — Returns `{"status": "ok", ...}` plus queue stats
//! - `GET  /mcp/{token}`  — Capability discovery document
//! - `POST /mcp/{token}`  — One JSON-RPC request unit
//!
//! The token path segment is the tenant credential; the transport passes it
//! through opaquely and the dispatcher resolves it against storage.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::context::AppContext;
use crate::dispatcher::Dispatcher;

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<AppContext>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        let dispatcher = Dispatcher::new(ctx.clone());
        Self { ctx, dispatcher }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/mcp/{token}", get(discovery_handler))
        .route("/mcp/{token}", post(rpc_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /health — liveness probe with execution queue statistics.
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": "multimcp",
        "queue": state.ctx.queue.stats(),
    }))
}

/// GET /mcp/{token} — capability discovery.
///
/// The document is static server metadata, served without tenant
/// resolution just like the `initialize` method; tenant-scoped data only
/// flows through POST.
async fn discovery_handler(
    State(state): State<AppState>,
    Path(_token): Path<String>,
) -> Json<Value> {
    Json(state.dispatcher.discovery())
}

/// POST /mcp/{token} — dispatch one JSON-RPC request unit.
///
/// Notifications produce `202 Accepted` with no body; everything else gets a
/// `200 OK` JSON-RPC envelope, including protocol-level errors.
async fn rpc_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> Response {
    match state.dispatcher.dispatch(&token, &body).await {
        Some(envelope) => Json(envelope).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::storage::MemoryStorage;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn fixture() -> (Router, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let ctx = AppContext::new(ServerConfig::default(), storage.clone());
        ctx.start().await;
        (app_router(AppState::new(ctx)), storage)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _) = fixture().await;

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["queue"]["maxWorkers"], 20);
        assert_eq!(json["queue"]["isStarted"], true);
    }

    #[tokio::test]
    async fn test_discovery_is_static_for_any_token() {
        let (app, storage) = fixture().await;
        storage.add_tenant("acme", "key-1");

        // Same static document whether or not the token resolves to a
        // tenant; discovery carries no tenant-scoped data.
        let known = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/mcp/key-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(known.status(), StatusCode::OK);
        let known_doc = body_json(known).await;
        assert_eq!(known_doc["serverInfo"]["name"], "multimcp");

        let unknown = app
            .oneshot(
                Request::builder()
                    .uri("/mcp/unknown-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(unknown.status(), StatusCode::OK);
        let unknown_doc = body_json(unknown).await;
        assert_eq!(unknown_doc, known_doc);
        assert!(unknown_doc.get("protocolVersion").is_some());
    }

    #[tokio::test]
    async fn test_rpc_tools_call_over_http() {
        let (app, storage) = fixture().await;
        let tenant = storage.add_tenant("acme", "key-1");
        storage.enable_tool(tenant.id, "core/echo", json!({}));

        let body = json!({
            "jsonrpc": "2.0",
            "method": "tools/call",
            "params": {"name": "core/echo", "arguments": {"message": "hi"}},
            "id": 1,
        });
        let request = Request::builder()
            .method("POST")
            .uri("/mcp/key-1")
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["result"]["content"][0]["text"], "Echo: hi");
    }

    #[tokio::test]
    async fn test_rpc_notification_is_accepted_without_body() {
        let (app, _) = fixture().await;

        let request = Request::builder()
            .method("POST")
            .uri("/mcp/any")
            .header("Content-Type", "application/json")
            .body(Body::from(
                r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_rpc_malformed_body_yields_protocol_error() {
        let (app, _) = fixture().await;

        let request = Request::builder()
            .method("POST")
            .uri("/mcp/any")
            .header("Content-Type", "application/json")
            .body(Body::from("not json"))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], -32600);
    }
}
