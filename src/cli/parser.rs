//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};

/// aisearch-mcp: Azure AI Search retrieval as MCP tools.
///
/// Serves `add` and `ai_search` over MCP, and ships client drivers that
/// call those tools directly or through a chat model.
#[derive(Parser, Debug)]
#[command(name = "aisearch-mcp")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the MCP server.
    #[command(subcommand)]
    Mcp(McpCommands),

    /// Run one retrieval and print the formatted sources.
    ///
    /// Uses the same pipeline as the `ai_search` tool, without MCP.
    #[command(after_help = r#"Examples:
  aisearch-mcp search "How do I reset my VPN token?"
  aisearch-mcp --format json search "printer offline"
"#)]
    Search {
        /// Natural-language query.
        query: String,
    },

    /// MCP client drivers (tools, call, ask).
    #[cfg(feature = "agent")]
    #[command(subcommand)]
    Client(ClientCommands),
}

/// MCP server transports.
#[derive(Subcommand, Debug)]
pub enum McpCommands {
    /// Start MCP server with stdio transport.
    ///
    /// Reads JSON-RPC messages from stdin, writes responses to stdout.
    #[command(after_help = r#"Examples:
  aisearch-mcp mcp stdio
"#)]
    Stdio,

    /// Start MCP server with streamable HTTP transport.
    ///
    /// Serves the MCP endpoint at `/mcp`.
    #[command(after_help = r#"Examples:
  aisearch-mcp mcp http                           # Listen on 0.0.0.0:8080
  aisearch-mcp mcp http --host 127.0.0.1 --port 3000
"#)]
    Http {
        /// Host to bind to.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to bind to.
        #[arg(long, default_value = "8080")]
        port: u16,
    },
}

/// Client driver subcommands.
#[cfg(feature = "agent")]
#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// List the tools a server advertises.
    #[command(after_help = r#"Examples:
  aisearch-mcp client tools
  aisearch-mcp client tools --url http://search-host:8080/mcp
"#)]
    Tools {
        /// MCP endpoint URL.
        #[arg(long, env = "MCP_SERVER_URL", default_value = crate::agent::config::DEFAULT_SERVER_URL)]
        url: String,
    },

    /// Call one tool directly.
    #[command(after_help = r#"Examples:
  aisearch-mcp client call add --args '{"a": 3, "b": 5}'
  aisearch-mcp client call ai_search --args '{"query": "reset VPN token"}'
"#)]
    Call {
        /// Tool name.
        name: String,

        /// Tool arguments as a JSON object.
        #[arg(long, default_value = "{}")]
        args: String,

        /// MCP endpoint URL.
        #[arg(long, env = "MCP_SERVER_URL", default_value = crate::agent::config::DEFAULT_SERVER_URL)]
        url: String,
    },

    /// Answer a prompt with a chat model that can call the server's tools.
    ///
    /// Requires an Azure OpenAI (or OpenAI) chat deployment.
    #[command(after_help = r#"Examples:
  aisearch-mcp client ask "What's (3 + 5) x 12?"
  aisearch-mcp client ask "How do I reset my VPN token?" --max-iterations 4
"#)]
    Ask {
        /// The prompt.
        prompt: String,

        /// MCP endpoint URL.
        #[arg(long, env = "MCP_SERVER_URL", default_value = crate::agent::config::DEFAULT_SERVER_URL)]
        url: String,

        /// Chat deployment or model (overrides `AZURE_OPENAI_CHAT_DEPLOYMENT`).
        #[arg(long)]
        model: Option<String>,

        /// Maximum tool-calling rounds.
        #[arg(long)]
        max_iterations: Option<usize>,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_http_defaults() {
        let cli = Cli::try_parse_from(["aisearch-mcp", "mcp", "http"])
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        match cli.command {
            Commands::Mcp(McpCommands::Http { host, port }) => {
                assert_eq!(host, "0.0.0.0");
                assert_eq!(port, 8080);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_search_requires_query() {
        assert!(Cli::try_parse_from(["aisearch-mcp", "search"]).is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["aisearch-mcp", "search", "vpn", "-v", "--format", "json"])
            .unwrap_or_else(|e| panic!("parse failed: {e}"));
        assert!(cli.verbose);
        assert_eq!(cli.format, "json");
    }

    #[cfg(feature = "agent")]
    #[test]
    fn test_client_call_args() {
        let cli = Cli::try_parse_from([
            "aisearch-mcp",
            "client",
            "call",
            "add",
            "--args",
            r#"{"a":1,"b":2}"#,
            "--url",
            "http://localhost:9000/mcp",
        ])
        .unwrap_or_else(|e| panic!("parse failed: {e}"));
        match cli.command {
            Commands::Client(ClientCommands::Call { name, args, url }) => {
                assert_eq!(name, "add");
                assert_eq!(args, r#"{"a":1,"b":2}"#);
                assert_eq!(url, "http://localhost:9000/mcp");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
