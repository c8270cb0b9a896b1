//! Calculator tool: basic arithmetic over two operands.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::ExecError;
use crate::tools::{Tool, ToolResult};

/// Arithmetic tool returning structured JSON results.
#[derive(Debug, Clone, Copy)]
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Perform basic arithmetic: add, subtract, multiply, divide"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "operation": {
                    "type": "string",
                    "enum": ["add", "subtract", "multiply", "divide"],
                    "description": "The arithmetic operation to perform"
                },
                "a": { "type": "number", "description": "First operand" },
                "b": { "type": "number", "description": "Second operand" }
            },
            "required": ["operation", "a", "b"]
        })
    }

    async fn execute(
        &self,
        arguments: &Value,
        _config: Option<&Value>,
    ) -> Result<ToolResult, ExecError> {
        let operation = arguments
            .get("operation")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let a = arguments.get("a").and_then(Value::as_f64).unwrap_or(0.0);
        let b = arguments.get("b").and_then(Value::as_f64).unwrap_or(0.0);

        let result = match operation {
            "add" => a + b,
            "subtract" => a - b,
            "multiply" => a * b,
            "divide" => {
                if b == 0.0 {
                    return Ok(ToolResult::error("division by zero"));
                }
                a / b
            }
            other => {
                return Ok(ToolResult::error(format!("unknown operation: {other}")));
            }
        };

        Ok(ToolResult::json(json!({
            "operation": operation,
            "operands": [a, b],
            "result": result,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_addition() {
        let result = CalculatorTool
            .execute(&json!({"operation": "add", "a": 20, "b": 22}), None)
            .await
            .unwrap();
        assert_eq!(result.structured_content.as_ref().unwrap()["result"], 42.0);
    }

    #[tokio::test]
    async fn test_division_by_zero_is_tool_error() {
        let result = CalculatorTool
            .execute(&json!({"operation": "divide", "a": 1, "b": 0}), None)
            .await
            .unwrap();
        assert!(result.is_error);
        assert_eq!(result.first_text(), Some("Error: division by zero"));
    }
}
