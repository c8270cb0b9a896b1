//! Tool capability system.
//!
//! Provides the `Tool` trait that invocable capabilities implement, the
//! schema and result types exchanged over the protocol, the registry that
//! names and filters tools per tenant, and the bounded execution queue
//! that runs them.

pub mod builtin;
pub mod queue;
pub mod registry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ExecError;

// ---------------------------------------------------------------------------
// ToolSchema
// ---------------------------------------------------------------------------

/// Protocol-facing tool schema definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Tool name as exposed to clients (may be namespaced, e.g. `core/echo`).
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

// ---------------------------------------------------------------------------
// ToolResult
// ---------------------------------------------------------------------------

/// Result of a tool execution.
///
/// Supports the content shapes the protocol understands: plain text blocks,
/// structured JSON (`structuredContent`), and error text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content blocks (`{"type": "text", "text": ...}`).
    pub content: Vec<Value>,
    /// Whether this result represents a tool-level error.
    #[serde(default)]
    pub is_error: bool,
    /// Structured JSON payload, preferred for machine consumption.
    #[serde(rename = "structuredContent", skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<Value>,
}

impl ToolResult {
    /// Plain text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![serde_json::json!({"type": "text", "text": text.into()})],
            is_error: false,
            structured_content: None,
        }
    }

    /// Structured JSON result.
    pub fn json(data: Value) -> Self {
        Self {
            content: Vec::new(),
            is_error: false,
            structured_content: Some(data),
        }
    }

    /// Tool-level error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![
                serde_json::json!({"type": "text", "text": format!("Error: {}", message.into())}),
            ],
            is_error: true,
            structured_content: None,
        }
    }

    /// First text block, if any. Used when rendering error envelopes.
    pub fn first_text(&self) -> Option<&str> {
        self.content
            .first()
            .and_then(|block| block.get("text"))
            .and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tool trait
// ---------------------------------------------------------------------------

/// An invocable capability.
///
/// Implementations are stateless singletons owned by the registry; `execute`
/// receives the caller's arguments and the tenant's opaque configuration
/// blob. Tools declaring a config schema are expected to receive a config
/// conforming to it.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name (unqualified; the registry may namespace it).
    fn name(&self) -> &str;

    /// Description shown to protocol clients.
    fn description(&self) -> &str;

    /// JSON Schema for the tool's input parameters.
    fn input_schema(&self) -> Value;

    /// JSON Schema for the per-tenant configuration, or `None` if the tool
    /// takes no configuration.
    fn config_schema(&self) -> Option<Value> {
        None
    }

    /// Whether this tool requires per-tenant configuration.
    fn requires_config(&self) -> bool {
        self.config_schema().is_some()
    }

    /// Execute the tool.
    async fn execute(
        &self,
        arguments: &Value,
        config: Option<&Value>,
    ) -> Result<ToolResult, ExecError>;

    /// Protocol schema for this tool under its declared name.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }

    /// Validate arguments against the input schema.
    ///
    /// Checks required fields and primitive types only; full JSON Schema
    /// validation is left to individual tools that need it.
    fn validate_arguments(&self, arguments: &Value) -> bool {
        let schema = self.input_schema();
        let args = match arguments.as_object() {
            Some(map) => map,
            None => return false,
        };

        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for field in required.iter().filter_map(Value::as_str) {
                if !args.contains_key(field) {
                    return false;
                }
            }
        }

        let properties = match schema.get("properties").and_then(Value::as_object) {
            Some(props) => props,
            None => return true,
        };
        for (field, value) in args {
            let expected = properties
                .get(field)
                .and_then(|p| p.get("type"))
                .and_then(Value::as_str);
            let ok = match expected {
                Some("string") => value.is_string(),
                Some("number") => value.is_number(),
                Some("boolean") => value.is_boolean(),
                Some("array") => value.is_array(),
                Some("object") => value.is_object(),
                _ => true,
            };
            if !ok {
                return false;
            }
        }
        true
    }
}

pub use queue::{ExecutionQueue, QueueStats};
pub use registry::ToolRegistry;
