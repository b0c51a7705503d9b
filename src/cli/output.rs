//! Output formatting for CLI commands.
//!
//! Supports plain text and JSON output.

#[cfg(feature = "agent")]
use std::fmt::Write;

use serde_json::json;

#[cfg(feature = "agent")]
use crate::agent::{AskOutcome, ToolDefinition};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON.
    Json,
}

impl OutputFormat {
    /// Parses a format name; anything unrecognized falls back to text.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Pretty-prints a JSON value, falling back to compact output.
fn to_json(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Formats the result of a one-shot retrieval.
#[must_use]
pub fn format_search(query: &str, output: &str, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => output.to_string(),
        OutputFormat::Json => to_json(&json!({ "query": query, "output": output })),
    }
}

/// Formats a tool listing.
#[cfg(feature = "agent")]
#[must_use]
pub fn format_tools(tools: &[ToolDefinition], format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for tool in tools {
                let _ = writeln!(out, "{}", tool.name);
                if !tool.description.is_empty() {
                    let _ = writeln!(out, "  {}", tool.description);
                }
                let _ = writeln!(out, "  schema: {}", tool.parameters);
            }
            out
        }
        OutputFormat::Json => to_json(&json!(tools)),
    }
}

/// Formats a direct tool call result.
#[cfg(feature = "agent")]
#[must_use]
pub fn format_call(name: &str, text: &str, is_error: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => text.to_string(),
        OutputFormat::Json => to_json(&json!({
            "tool": name,
            "is_error": is_error,
            "text": text,
        })),
    }
}

/// Formats the outcome of a model-driven ask.
#[cfg(feature = "agent")]
#[must_use]
pub fn format_ask(outcome: &AskOutcome, verbose: bool, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            if verbose {
                for exchange in &outcome.exchanges {
                    let _ = writeln!(
                        out,
                        "[tool] {}({}) -> {}",
                        exchange.call.name, exchange.call.arguments, exchange.result.content
                    );
                }
                let _ = writeln!(out, "[tokens] {}", outcome.usage.total_tokens);
            }
            out.push_str(&outcome.answer);
            out
        }
        OutputFormat::Json => to_json(&json!({
            "answer": outcome.answer,
            "tool_calls": outcome.exchanges,
            "usage": outcome.usage,
        })),
    }
}
