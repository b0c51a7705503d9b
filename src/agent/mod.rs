//! MCP client drivers.
//!
//! Connects to an `aisearch-mcp` endpoint (or any MCP server) over
//! streamable HTTP and either calls tools directly or lets a chat model
//! drive them.
//!
//! # Architecture
//!
//! ```text
//! McpSession ── list_tools ──► Vec<ToolDefinition>
//!     │                              │
//!     │ (ToolExecutor)               ▼
//!     └──────────◄──── ToolAgent::ask ──► LlmProvider (Azure / OpenAI)
//! ```
//!
//! # Feature Gate
//!
//! This module requires the `agent` feature flag (on by default):
//! ```toml
//! [dependencies]
//! aisearch-mcp = { version = "...", features = ["agent"] }
//! ```

pub mod agentic_loop;
pub mod client;
pub mod config;
pub mod driver;
pub mod executor;
pub mod message;
pub mod provider;
pub mod providers;
pub mod session;
pub mod tool;

// Re-export key types
pub use agentic_loop::{LoopOutcome, agentic_loop};
pub use client::create_provider;
pub use config::AgentConfig;
pub use driver::{AskOutcome, ToolAgent};
pub use executor::ToolExecutor;
pub use message::{ChatMessage, ChatRequest, ChatResponse, Role, TokenUsage};
pub use provider::LlmProvider;
pub use session::{McpSession, result_text};
pub use tool::{ToolCall, ToolDefinition, ToolExchange, ToolResult};
