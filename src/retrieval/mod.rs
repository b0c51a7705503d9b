//! Hybrid document retrieval.
//!
//! Embeds a query, runs a vector + semantic hybrid search against one
//! index, and formats the results that clear the reranker threshold.
//!
//! # Architecture
//!
//! ```text
//! ai_search(query)
//!   ↓
//! RetrievalPipeline
//!   ├── Embedder (Azure OpenAI embeddings)       → query vector
//!   ├── SearchBackend (Azure AI Search REST)     → ranked documents
//!   └── format_results (reranker gate, numbering) → text
//! ```

pub mod config;
pub mod embedding;
pub mod format;
pub mod pipeline;
pub mod search;

pub use config::{DEFAULT_RERANKER_THRESHOLD, SearchConfig, SearchConfigBuilder};
pub use embedding::{AzureOpenAiEmbedder, Embedder};
pub use format::{FormatStats, Formatted, format_results};
pub use pipeline::RetrievalPipeline;
pub use search::{
    AzureSearchClient, SearchBackend, SearchDocument, SearchRequest, SearchResponse,
};
