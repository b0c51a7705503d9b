//! CLI command implementations.
//!
//! Each command builds its own tokio runtime and blocks on it, so the
//! binary's `main` stays synchronous.

use std::future::Future;

use crate::cli::output::{OutputFormat, format_search};
use crate::cli::parser::{Cli, Commands, McpCommands};
use crate::error::{CommandError, Result};
use crate::mcp::{SearchMcpServer, serve_http, serve_stdio};
use crate::retrieval::{RetrievalPipeline, SearchConfig};

/// Executes the CLI command.
///
/// # Returns
///
/// Result with output string on success.
///
/// # Errors
///
/// Returns an error if configuration is missing, an upstream service fails,
/// or the MCP server cannot be reached.
pub fn execute(cli: &Cli) -> Result<String> {
    let format = OutputFormat::parse(&cli.format);

    match &cli.command {
        Commands::Mcp(cmd) => cmd_mcp(cmd),
        Commands::Search { query } => cmd_search(query, format),
        #[cfg(feature = "agent")]
        Commands::Client(cmd) => client::execute(cmd, cli.verbose, format),
    }
}

/// Runs a future to completion on a fresh multi-threaded runtime.
fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().map_err(|e| {
        CommandError::ExecutionFailed(format!("Failed to create async runtime: {e}"))
    })?;
    Ok(rt.block_on(future))
}

fn cmd_mcp(cmd: &McpCommands) -> Result<String> {
    let config = SearchConfig::from_env()?;
    let server = SearchMcpServer::from_config(config)?;

    block_on(async {
        match cmd {
            McpCommands::Stdio => serve_stdio(server).await,
            McpCommands::Http { host, port } => serve_http(server, host, *port).await,
        }
    })?
    .map_err(|e| CommandError::ExecutionFailed(format!("MCP server error: {e}")))?;

    Ok(String::new())
}

fn cmd_search(query: &str, format: OutputFormat) -> Result<String> {
    let config = SearchConfig::from_env()?;
    let pipeline = RetrievalPipeline::from_config(config)?;
    let output = block_on(pipeline.retrieve(query))??;
    Ok(format_search(query, &output, format))
}

#[cfg(feature = "agent")]
mod client {
    use super::block_on;
    use crate::agent::executor::parse_arguments;
    use crate::agent::{AgentConfig, McpSession, ToolAgent, ToolCall, create_provider, result_text};
    use crate::cli::output::{OutputFormat, format_ask, format_call, format_tools};
    use crate::cli::parser::ClientCommands;
    use crate::error::{CommandError, Error, Result};

    pub(super) fn execute(
        cmd: &ClientCommands,
        verbose: bool,
        format: OutputFormat,
    ) -> Result<String> {
        match cmd {
            ClientCommands::Tools { url } => cmd_tools(url, format),
            ClientCommands::Call { name, args, url } => cmd_call(url, name, args, format),
            ClientCommands::Ask {
                prompt,
                url,
                model,
                max_iterations,
            } => {
                let mut builder = AgentConfig::builder().server_url(url.as_str());
                if let Some(model) = model {
                    builder = builder.chat_deployment(model.as_str());
                }
                if let Some(n) = max_iterations {
                    builder = builder.max_tool_iterations(*n);
                }
                let config = builder.from_env().build()?;
                cmd_ask(&config, prompt, verbose, format)
            }
        }
    }

    fn cmd_tools(url: &str, format: OutputFormat) -> Result<String> {
        block_on(async {
            let session = McpSession::connect(url).await?;
            let tools = session.list_tools().await;
            session.close().await?;
            Ok::<_, Error>(format_tools(&tools?, format))
        })?
    }

    fn cmd_call(url: &str, name: &str, args: &str, format: OutputFormat) -> Result<String> {
        let arguments = parse_arguments(&ToolCall {
            id: String::new(),
            name: name.to_string(),
            arguments: args.to_string(),
        })
        .map_err(|e| CommandError::InvalidArgument(format!("--args: {e}")))?;

        block_on(async {
            let session = McpSession::connect(url).await?;
            let result = session.call_tool(name, arguments).await;
            session.close().await?;
            let result = result?;
            let text = result_text(&result);
            let is_error = result.is_error == Some(true);
            if is_error && format == OutputFormat::Text {
                return Err(CommandError::ExecutionFailed(format!("{name} failed: {text}")).into());
            }
            Ok::<_, Error>(format_call(name, &text, is_error, format))
        })?
    }

    fn cmd_ask(
        config: &AgentConfig,
        prompt: &str,
        verbose: bool,
        format: OutputFormat,
    ) -> Result<String> {
        let provider = create_provider(config)?;
        let agent = ToolAgent::new(provider, config);

        block_on(async {
            let session = McpSession::connect(&config.server_url).await?;
            let outcome = match session.list_tools().await {
                Ok(tools) => agent.ask(&session, tools, prompt).await,
                Err(e) => Err(e),
            };
            session.close().await?;
            Ok::<_, Error>(format_ask(&outcome?, verbose, format))
        })?
    }
}
