//! JSON-RPC protocol envelopes and server metadata.
//!
//! Request parsing plus the response/error builders used by the dispatcher.
//! Every outbound message is built here so that all code paths produce a
//! syntactically valid envelope.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::McpError;

/// JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// MCP protocol revision advertised during capability negotiation.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// Standard JSON-RPC error codes.
pub mod error_codes {
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

// ---------------------------------------------------------------------------
// JsonRpcRequest
// ---------------------------------------------------------------------------

/// An inbound JSON-RPC call or notification.
///
/// A request with an `id` expects a response; one without is a
/// notification and must not produce a response body.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Option<Value>,
}

impl JsonRpcRequest {
    /// Parse a raw request body.
    ///
    /// Empty or non-JSON-RPC bodies are reported as `InvalidRequest`.
    pub fn parse(body: &[u8]) -> Result<Self, McpError> {
        if body.is_empty() {
            return Err(McpError::InvalidRequest("empty request body".into()));
        }
        serde_json::from_slice(body)
            .map_err(|e| McpError::InvalidRequest(format!("malformed request: {e}")))
    }

    /// Whether this request is a notification (no correlation id).
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Fetch a required string parameter, or `InvalidArguments`.
    pub fn require_str_param(&self, name: &str) -> Result<&str, McpError> {
        self.params
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| McpError::InvalidArguments(format!("missing required parameter: {name}")))
    }
}

// ---------------------------------------------------------------------------
// Envelope builders
// ---------------------------------------------------------------------------

/// Build a success envelope.
pub fn success(id: Option<Value>, result: Value) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id.unwrap_or(Value::Null),
        "result": result,
    })
}

/// Build an error envelope from an explicit code and message.
pub fn error(id: Option<Value>, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id.unwrap_or(Value::Null),
        "error": {
            "code": code,
            "message": message.into(),
        },
    })
}

/// Build an error envelope from an `McpError`.
pub fn error_from(id: Option<Value>, err: &McpError) -> Value {
    error(id, err.code(), err.to_string())
}

/// Static server capability/version document.
///
/// Served both for the HTTP discovery GET and as the `initialize` result.
pub fn server_capabilities(server_name: &str) -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": true },
            "resources": { "listChanged": true },
            "prompts": { "listChanged": true },
            "logging": {},
            "experimental": { "streaming": true },
        },
        "serverInfo": {
            "name": server_name,
            "version": crate::VERSION,
        },
    })
}
