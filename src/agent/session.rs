//! MCP client session over streamable HTTP.

use async_trait::async_trait;
use rmcp::model::{CallToolRequestParams, CallToolResult};
use rmcp::service::RunningService;
use rmcp::transport::StreamableHttpClientTransport;
use rmcp::{RoleClient, ServiceExt};
use tracing::{debug, info};

use crate::error::AgentError;

use super::executor::ToolExecutor;
use super::tool::ToolDefinition;

/// A connected MCP client.
pub struct McpSession {
    service: RunningService<RoleClient, ()>,
    url: String,
}

impl McpSession {
    /// Connects to a streamable HTTP MCP endpoint and completes initialization.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Mcp`] if the server is unreachable or the
    /// handshake fails.
    pub async fn connect(url: &str) -> Result<Self, AgentError> {
        let transport = StreamableHttpClientTransport::from_uri(url.to_string());
        let service = ().serve(transport).await.map_err(|e| AgentError::Mcp {
            message: format!("connecting to {url}: {e}"),
        })?;

        if let Some(peer) = service.peer_info() {
            info!(
                server = %peer.server_info.name,
                version = %peer.server_info.version,
                "connected to MCP server"
            );
        }

        Ok(Self {
            service,
            url: url.to_string(),
        })
    }

    /// Returns the endpoint this session is connected to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Lists every tool the server advertises.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Mcp`] on transport or protocol failure.
    pub async fn list_tools(&self) -> Result<Vec<ToolDefinition>, AgentError> {
        let tools = self
            .service
            .list_all_tools()
            .await
            .map_err(|e| AgentError::Mcp {
                message: format!("listing tools: {e}"),
            })?;
        debug!(count = tools.len(), "listed tools");
        Ok(tools.iter().map(ToolDefinition::from).collect())
    }

    /// Calls a tool and returns the raw MCP result.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Mcp`] if the call fails at the protocol level
    /// (unknown tool, invalid params, server-side internal error).
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<CallToolResult, AgentError> {
        let params: CallToolRequestParams = serde_json::from_value(serde_json::json!({
            "name": name,
            "arguments": arguments,
        }))
        .map_err(|e| AgentError::Mcp {
            message: format!("building call for {name}: {e}"),
        })?;

        debug!(tool = name, "calling tool");
        self.service
            .call_tool(params)
            .await
            .map_err(|e| AgentError::Mcp {
                message: format!("calling {name}: {e}"),
            })
    }

    /// Shuts the session down.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Mcp`] if the background task cannot be joined.
    pub async fn close(self) -> Result<(), AgentError> {
        self.service
            .cancel()
            .await
            .map(|_| ())
            .map_err(|e| AgentError::Mcp {
                message: format!("closing session: {e}"),
            })
    }
}

impl std::fmt::Debug for McpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpSession")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// Concatenates the text parts of a tool result.
#[must_use]
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl ToolExecutor for McpSession {
    async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, AgentError> {
        let result = self.call_tool(name, arguments).await?;
        let text = result_text(&result);
        if result.is_error == Some(true) {
            return Err(AgentError::Mcp {
                message: format!("{name} reported an error: {text}"),
            });
        }
        Ok(text)
    }
}
