//! # aisearch-mcp
//!
//! An MCP (Model Context Protocol) tool server that puts Azure AI Search
//! retrieval in front of language-model clients, plus the client drivers
//! that talk to it.
//!
//! ## Tools
//!
//! - `add(a, b)` returns the integer sum.
//! - `ai_search(query)` embeds the query with an Azure `OpenAI` embedding
//!   deployment, runs a hybrid vector + semantic search, keeps documents
//!   whose reranker score clears the threshold, and returns them as
//!   numbered `Source N` blocks.
//!
//! ## Architecture
//!
//! ```text
//! cli ──► mcp (SearchMcpServer, stdio / streamable HTTP)
//!  │          │
//!  │          ├── core::add
//!  │          └── retrieval::RetrievalPipeline
//!  │                 ├── Embedder      (Azure OpenAI embeddings)
//!  │                 ├── SearchBackend (Azure AI Search REST)
//!  │                 └── format_results
//!  └──► agent (McpSession, ToolAgent, LlmProvider)   [feature "agent"]
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use aisearch_mcp::retrieval::{RetrievalPipeline, SearchConfig};
//!
//! # async fn run() -> Result<(), aisearch_mcp::Error> {
//! let config = SearchConfig::from_env()?;
//! let pipeline = RetrievalPipeline::from_config(config)?;
//! let sources = pipeline.retrieve("How do I reset my VPN token?").await?;
//! println!("{sources}");
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "agent")]
pub mod agent;
pub mod cli;
pub mod core;
pub mod error;
pub mod mcp;
pub mod retrieval;

pub use error::{Error, Result};
pub use mcp::SearchMcpServer;
pub use retrieval::{RetrievalPipeline, SearchConfig};
