//! CLI layer for aisearch-mcp.
//!
//! Provides the command-line interface using clap, with commands for
//! serving MCP, running one-shot retrievals, and driving MCP clients.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
#[cfg(feature = "agent")]
pub use parser::ClientCommands;
pub use parser::{Cli, Commands, McpCommands};
