//! aisearch-mcp binary entry point.

use std::process::ExitCode;

use aisearch_mcp::cli::{Cli, execute};
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the stderr subscriber; stdout is reserved for command output and
/// MCP stdio frames.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "aisearch_mcp=debug"
    } else {
        "aisearch_mcp=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[allow(clippy::print_stdout, clippy::print_stderr)]
fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match execute(&cli) {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
