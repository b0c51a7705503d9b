//! MCP transport layer for stdio and streamable HTTP.
//!
//! Provides functions to start the MCP server with different transports.

use std::sync::Arc;

use rmcp::ServiceExt;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::server::SearchMcpServer;

/// Path the streamable HTTP service is mounted at.
pub const MCP_PATH: &str = "/mcp";

/// Starts the MCP server with stdio transport.
///
/// The server reads JSON-RPC messages from stdin and writes responses to stdout.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a runtime error.
pub async fn serve_stdio(server: SearchMcpServer) -> anyhow::Result<()> {
    info!("serving MCP over stdio");
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

/// Builds the axum router exposing `server` over streamable HTTP at [`MCP_PATH`].
///
/// Each MCP session gets its own clone of `server`; clones share the
/// retrieval pipeline.
pub fn router(server: SearchMcpServer, ct: &CancellationToken) -> axum::Router {
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig {
            cancellation_token: ct.child_token(),
            ..Default::default()
        },
    );

    axum::Router::new().nest_service(MCP_PATH, service)
}

/// Starts the MCP server with streamable HTTP transport.
///
/// Listens on the given host and port for incoming MCP connections at
/// [`MCP_PATH`]. Responses stream back as server-sent events. Runs until
/// Ctrl-C.
///
/// # Errors
///
/// Returns an error if the server fails to bind or encounters a runtime error.
pub async fn serve_http(server: SearchMcpServer, host: &str, port: u16) -> anyhow::Result<()> {
    let ct = CancellationToken::new();
    let router = router(server, &ct);

    let addr = format!("{host}:{port}");
    let tcp_listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, path = MCP_PATH, "MCP server listening on http://{addr}{MCP_PATH}");

    axum::serve(tcp_listener, router)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
            ct.cancel();
        })
        .await?;

    Ok(())
}
