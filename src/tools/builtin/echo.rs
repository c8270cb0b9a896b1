//! Echo tool: returns the input message.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::ExecError;
use crate::tools::{Tool, ToolResult};

/// Simple echo tool for verifying protocol plumbing.
#[derive(Debug, Clone, Copy)]
pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo back the provided message"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "description": "The message to echo back"
                }
            },
            "required": ["message"]
        })
    }

    async fn execute(
        &self,
        arguments: &Value,
        _config: Option<&Value>,
    ) -> Result<ToolResult, ExecError> {
        let message = arguments
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default();
        Ok(ToolResult::text(format!("Echo: {message}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo_round_trip() {
        let result = EchoTool
            .execute(&json!({"message": "hello"}), None)
            .await
            .unwrap();
        assert_eq!(result.first_text(), Some("Echo: hello"));
        assert!(!result.is_error);
    }
}
