//! Tool type definitions for function-calling.
//!
//! Provider-agnostic types for the tools an MCP server advertises, the calls
//! a model requests, and the results sent back.

use rmcp::model::Tool;
use serde::{Deserialize, Serialize};

/// A tool definition that can be sent to an LLM for function-calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name, as registered on the MCP server.
    pub name: String,
    /// Human-readable description of what the tool does.
    pub description: String,
    /// JSON Schema object describing the tool's parameters.
    pub parameters: serde_json::Value,
}

impl From<&Tool> for ToolDefinition {
    fn from(tool: &Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.as_deref().unwrap_or_default().to_string(),
            parameters: serde_json::Value::Object(tool.input_schema.as_ref().clone()),
        }
    }
}

/// A tool call requested by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this call (assigned by the provider).
    pub id: String,
    /// Name of the tool to invoke.
    pub name: String,
    /// JSON-encoded arguments for the tool.
    pub arguments: String,
}

/// The result of executing a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the tool call this result corresponds to.
    pub tool_call_id: String,
    /// Result content (tool text on success, `{"error": ...}` on failure).
    pub content: String,
    /// Whether this result represents an error.
    pub is_error: bool,
}

/// One executed call paired with its result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExchange {
    /// What the model asked for.
    pub call: ToolCall,
    /// What the tool returned.
    pub result: ToolResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_definition_from_mcp_tool() {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {"query": {"type": "string"}},
            "required": ["query"]
        });
        let tool = Tool::new(
            "ai_search",
            "Retrieve documents",
            Arc::new(schema.as_object().cloned().unwrap_or_default()),
        );

        let def = ToolDefinition::from(&tool);
        assert_eq!(def.name, "ai_search");
        assert_eq!(def.description, "Retrieve documents");
        assert_eq!(def.parameters, schema);
    }

    #[test]
    fn test_tool_result_serialization() {
        let result = ToolResult {
            tool_call_id: "call_123".to_string(),
            content: "5".to_string(),
            is_error: false,
        };
        let json = serde_json::to_string(&result).unwrap_or_default();
        assert!(json.contains("call_123"));
        assert!(!result.is_error);
    }
}
