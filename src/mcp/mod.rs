//! MCP (Model Context Protocol) server for aisearch-mcp.
//!
//! Exposes the retrieval pipeline and integer addition as MCP tools over
//! stdio or streamable HTTP.
//!
//! # Architecture
//!
//! ```text
//! MCP Client (LLM agent)
//!   ↓ ai_search(query)          ↓ add(a, b)
//! SearchMcpServer (rmcp ToolRouter)
//!   ↓ request cancellation token
//! RetrievalPipeline::retrieve_with_cancel()
//!   ├── Embedder
//!   ├── SearchBackend
//!   └── format_results
//!   ↓
//! text content → MCP Client
//! ```

pub mod params;
pub mod server;
pub mod transport;

pub use params::{AddParams, AiSearchParams};
pub use server::SearchMcpServer;
pub use transport::{MCP_PATH, serve_http, serve_stdio};
