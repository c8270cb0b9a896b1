//! HTTP transport for the multi-tenant capability server.
//!
//! Exposes the protocol over a minimal axum surface; everything behind it
//! goes through the dispatcher.
//!
//! # Endpoints
//!
//! - `GET  /health`       — Liveness probe with queue statistics
//! - `GET  /mcp/{token}`  — Capability discovery for one tenant endpoint
//! - `POST /mcp/{token}`  — JSON-RPC request unit

pub mod routes;

pub use routes::{app_router, AppState};
