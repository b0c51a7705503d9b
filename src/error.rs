//! Error types for aisearch-mcp.
//!
//! Each layer owns a `thiserror` enum; [`Error`] aggregates them for the
//! CLI and library entry points.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The retrieval pipeline failed.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    /// A client driver operation failed.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// A CLI command failed.
    #[error(transparent)]
    Command(#[from] CommandError),
}

/// Missing or malformed configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required value was not provided explicitly or through the environment.
    #[error("missing required configuration: {var} is not set")]
    Missing {
        /// Environment variable that would supply the value.
        var: &'static str,
    },

    /// A value was provided but could not be parsed.
    #[error("invalid value for {var}: {message}")]
    Invalid {
        /// Environment variable that supplied the value.
        var: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// The HTTP client for an outbound service could not be built.
    #[error("cannot build HTTP client: {message}")]
    HttpClient {
        /// Underlying `reqwest` error.
        message: String,
    },
}

/// Failures from the embedding or search services.
///
/// The pipeline never recovers from these locally; the transport layer turns
/// them into protocol-level error responses.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// The embedding call failed (network, auth, quota).
    #[error("embedding request failed: {message}")]
    Embedding {
        /// Upstream error message.
        message: String,
    },

    /// The embedding service answered with no vectors.
    #[error("embedding service returned no vectors for deployment {deployment}")]
    EmptyEmbedding {
        /// Deployment that was queried.
        deployment: String,
    },

    /// The search request could not be sent or its response not received.
    #[error("search request failed: {message}")]
    SearchRequest {
        /// Upstream error message.
        message: String,
    },

    /// The search service rejected the request.
    #[error("search service returned HTTP {status}: {body}")]
    SearchStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// The search response body was not the expected shape.
    #[error("failed to decode search response: {message}")]
    SearchDecode {
        /// Decoder error message.
        message: String,
    },

    /// The caller cancelled the request before it completed.
    #[error("retrieval cancelled")]
    Cancelled,
}

/// Failures in the MCP client drivers.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Connecting to or talking with the MCP server failed.
    #[error("MCP client error: {message}")]
    Mcp {
        /// Error message.
        message: String,
    },

    /// Chat completion request failed.
    #[error("chat completion failed: {message}")]
    ApiRequest {
        /// Error message.
        message: String,
    },

    /// Tool arguments could not be parsed.
    #[error("invalid arguments for tool {name}: {message}")]
    ToolArguments {
        /// Tool name.
        name: String,
        /// Parse error.
        message: String,
    },

    /// The model kept requesting tools past the iteration limit.
    #[error("tool-calling loop exceeded {max_iterations} iterations")]
    ToolLoopExceeded {
        /// Configured limit.
        max_iterations: usize,
    },
}

/// CLI command failures.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Command execution failed.
    #[error("{0}")]
    ExecutionFailed(String),

    /// Invalid command-line argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
