//! # multimcp
//!
//! A multi-tenant capability server speaking a JSON-RPC tool/resource
//! protocol over HTTP. One process hosts a static catalog of tools and
//! resources; each tenant reaches it through its own credentialed endpoint
//! and only sees the capabilities enabled for it.
//!
//! The crate is organized around a handful of collaborators wired together
//! in [`context::AppContext`]:
//!
//! - [`tools`] / [`resources`] — capability registries and builtin tables
//! - [`tools::ExecutionQueue`] — bounded worker pool with admission control
//! - [`cache`] — TTL cache over per-tenant capability configuration
//! - [`dispatcher`] — the protocol method table
//! - [`storage`] / [`audit`] — external persistence contract and
//!   fire-and-forget invocation recording
//! - [`server`] — the axum HTTP transport

pub mod audit;
pub mod cache;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod errors;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod storage;
pub mod tools;

pub use cache::{ConfigCache, ConfigKind};
pub use context::AppContext;
pub use dispatcher::Dispatcher;
pub use errors::McpError;
pub use storage::{MemoryStorage, Storage, Tenant};
pub use tools::{ExecutionQueue, Tool, ToolRegistry, ToolResult};

/// Crate version, advertised in capability negotiation and `/health`.
pub const VERSION: &str = "0.1.0";
