//! Tool execution seam for the agentic loop.
//!
//! The loop only needs "run this call, give me text back"; [`McpSession`]
//! answers that over MCP, tests answer it with mocks.
//!
//! [`McpSession`]: super::session::McpSession

use async_trait::async_trait;

use crate::error::AgentError;

use super::tool::{ToolCall, ToolResult};

/// Maximum raw byte length of tool argument JSON from the LLM.
pub const MAX_TOOL_ARGS_LEN: usize = 100_000;

/// Executes tool calls requested by the model.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Invokes a tool by name with JSON-object arguments, returning its text.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError`] if the tool is unknown, rejects its arguments,
    /// or the transport fails.
    async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, AgentError>;

    /// Runs one model-requested call, never failing.
    ///
    /// Failures become `{"error": "..."}` content so the model can see them.
    async fn execute(&self, call: &ToolCall) -> ToolResult {
        match self.run(call).await {
            Ok(content) => ToolResult {
                tool_call_id: call.id.clone(),
                content,
                is_error: false,
            },
            Err(e) => ToolResult {
                tool_call_id: call.id.clone(),
                content: error_payload(&e.to_string()),
                is_error: true,
            },
        }
    }

    /// Validates and parses the call's arguments, then invokes the tool.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::ToolArguments`] for oversized or non-object
    /// arguments, or whatever [`ToolExecutor::invoke`] returns.
    async fn run(&self, call: &ToolCall) -> Result<String, AgentError> {
        let arguments = parse_arguments(call)?;
        self.invoke(&call.name, arguments).await
    }
}

/// Parses the model's argument string into a JSON object.
///
/// An empty string counts as `{}`.
///
/// # Errors
///
/// Returns [`AgentError::ToolArguments`] if the payload is too large, is not
/// valid JSON, or is not an object.
pub fn parse_arguments(
    call: &ToolCall,
) -> Result<serde_json::Map<String, serde_json::Value>, AgentError> {
    let invalid = |message: String| AgentError::ToolArguments {
        name: call.name.clone(),
        message,
    };

    if call.arguments.len() > MAX_TOOL_ARGS_LEN {
        return Err(invalid(format!(
            "tool arguments too large ({} bytes, max {MAX_TOOL_ARGS_LEN})",
            call.arguments.len()
        )));
    }
    if call.arguments.trim().is_empty() {
        return Ok(serde_json::Map::new());
    }

    match serde_json::from_str(&call.arguments) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(invalid(format!("expected a JSON object, got {other}"))),
        Err(e) => Err(invalid(e.to_string())),
    }
}

/// Renders an error message as the JSON object fed back to the model.
#[must_use]
pub fn error_payload(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}
