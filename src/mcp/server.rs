//! MCP server implementation for aisearch-mcp.
//!
//! Registers `add` and `ai_search` as MCP tools. Retrieval failures are
//! returned to the caller as MCP internal errors; an empty result set is a
//! successful empty text response.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, tool, tool_handler, tool_router};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::add;
use crate::retrieval::{RetrievalPipeline, SearchConfig};

use super::params::{AddParams, AiSearchParams};

/// Server name announced during MCP initialization.
pub const SERVER_NAME: &str = "InfoHub";

/// aisearch-mcp MCP server.
///
/// Cheap to clone: clones share one [`RetrievalPipeline`].
#[derive(Clone)]
pub struct SearchMcpServer {
    tool_router: ToolRouter<Self>,
    pipeline: Arc<RetrievalPipeline>,
}

#[tool_router]
impl SearchMcpServer {
    /// Add two numbers together.
    #[tool(name = "add", description = "Add two numbers together")]
    async fn add(
        &self,
        Parameters(AddParams { a, b }): Parameters<AddParams>,
    ) -> Result<CallToolResult, McpError> {
        let sum = add(a, b).ok_or_else(|| {
            McpError::invalid_params(format!("{a} + {b} overflows a 64-bit integer"), None)
        })?;
        Ok(CallToolResult::success(vec![Content::text(sum.to_string())]))
    }

    /// Retrieve documents from the search index using hybrid search.
    #[tool(
        name = "ai_search",
        description = "Retrieve documents from an Azure AI Search index using hybrid search: the query is embedded for vector similarity search, candidates are reranked semantically, and results with a reranker score of at least the configured threshold are returned as numbered sources with their content and scores. Returns an empty string when no document is relevant enough."
    )]
    async fn ai_search(
        &self,
        Parameters(params): Parameters<AiSearchParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        self.search(&params.query, &context.ct).await
    }
}

#[tool_handler]
impl ServerHandler for SearchMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                title: Some("Azure AI Search MCP Server".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Use `ai_search` to retrieve relevant passages from the document index \
                 before answering questions about its content. `add` adds two integers."
                    .to_string(),
            ),
        }
    }
}

impl SearchMcpServer {
    /// Creates a server around an existing pipeline.
    #[must_use]
    pub fn new(pipeline: Arc<RetrievalPipeline>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            pipeline,
        }
    }

    /// Creates a server backed by the Azure services named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the outbound HTTP clients cannot be built.
    pub fn from_config(config: SearchConfig) -> Result<Self, crate::error::Error> {
        let pipeline = RetrievalPipeline::from_config(config)?;
        Ok(Self::new(Arc::new(pipeline)))
    }

    /// Returns the shared pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &RetrievalPipeline {
        &self.pipeline
    }

    /// Runs the pipeline for one `ai_search` call.
    async fn search(
        &self,
        query: &str,
        ct: &CancellationToken,
    ) -> Result<CallToolResult, McpError> {
        debug!(query_len = query.len(), "ai_search called");
        let output = self
            .pipeline
            .retrieve_with_cancel(query, ct)
            .await
            .map_err(|e| {
                warn!(error = %e, "ai_search failed");
                McpError::internal_error(format!("Retrieval failed: {e}"), None)
            })?;
        Ok(CallToolResult::success(vec![Content::text(output)]))
    }
}
