//! MCP tool parameter types.
//!
//! Defines the input schemas for MCP tools using `schemars` for automatic
//! JSON Schema generation required by the MCP protocol.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `add` MCP tool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct AddParams {
    /// First number to add.
    pub a: i64,
    /// Second number to add.
    pub b: i64,
}

/// Parameters for the `ai_search` MCP tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AiSearchParams {
    /// The search query string.
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_search_schema_requires_query() {
        let schema = serde_json::to_value(schemars::schema_for!(AiSearchParams))
            .unwrap_or_default();
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert_eq!(schema["required"], serde_json::json!(["query"]));
    }

    #[test]
    fn test_add_params_reject_non_integers() {
        let parsed: Result<AddParams, _> = serde_json::from_str(r#"{"a": 1.5, "b": 2}"#);
        assert!(parsed.is_err());
    }
}
