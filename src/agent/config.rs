//! Client driver configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.

use std::time::Duration;

use crate::error::ConfigError;

/// Default MCP endpoint the drivers connect to.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080/mcp";
/// Default system prompt for the tool-calling agent.
pub const DEFAULT_SYSTEM_PROMPT: &str = "Answer questions using the tools provided.";
/// Default maximum tool-calling loop iterations.
const DEFAULT_MAX_TOOL_ITERATIONS: usize = 10;
/// Default completion max tokens.
const DEFAULT_MAX_TOKENS: u32 = 4096;
/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable names.
pub mod env {
    /// Provider name (`azure` or `openai`).
    pub const PROVIDER: &str = "AISEARCH_MCP_PROVIDER";
    /// Azure OpenAI endpoint.
    pub const AZURE_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
    /// Azure OpenAI key.
    pub const AZURE_KEY: &str = "AZURE_OPENAI_KEY";
    /// Azure OpenAI API version.
    pub const AZURE_VERSION: &str = "AZURE_OPENAI_VERSION";
    /// Chat model deployment.
    pub const CHAT_DEPLOYMENT: &str = "AZURE_OPENAI_CHAT_DEPLOYMENT";
    /// `OpenAI` API key, used when the provider is `openai`.
    pub const OPENAI_KEY: &str = "OPENAI_API_KEY";
    /// `OpenAI` base URL override.
    pub const OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
    /// MCP server URL.
    pub const SERVER_URL: &str = "MCP_SERVER_URL";
}

/// Configuration for the client drivers.
#[derive(Clone)]
pub struct AgentConfig {
    /// LLM provider name (`"azure"` or `"openai"`).
    pub provider: String,
    /// API key for the provider.
    pub api_key: String,
    /// Azure endpoint, or base URL override for `openai`.
    pub endpoint: Option<String>,
    /// Azure API version.
    pub api_version: Option<String>,
    /// Chat deployment (Azure) or model name (`openai`).
    pub chat_deployment: String,
    /// MCP server endpoint.
    pub server_url: String,
    /// System prompt for the tool-calling agent.
    pub system_prompt: String,
    /// Maximum tool-calling loop iterations before aborting.
    pub max_tool_iterations: usize,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Request timeout.
    pub timeout: Duration,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("chat_deployment", &self.chat_deployment)
            .field("server_url", &self.server_url)
            .field("max_tool_iterations", &self.max_tool_iterations)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl AgentConfig {
    /// Creates a new builder for `AgentConfig`.
    #[must_use]
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if no API key or chat deployment is found.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::builder().from_env().build()
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug, Clone, Default)]
pub struct AgentConfigBuilder {
    provider: Option<String>,
    api_key: Option<String>,
    endpoint: Option<String>,
    api_version: Option<String>,
    chat_deployment: Option<String>,
    server_url: Option<String>,
    system_prompt: Option<String>,
    max_tool_iterations: Option<usize>,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
}

/// Reads a variable, treating an empty value as unset.
fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AgentConfigBuilder {
    /// Populates unset fields from environment variables.
    #[must_use]
    pub fn from_env(mut self) -> Self {
        if self.provider.is_none() {
            self.provider = var(env::PROVIDER);
        }
        let openai = self.provider.as_deref() == Some("openai");
        if self.api_key.is_none() {
            self.api_key = if openai {
                var(env::OPENAI_KEY)
            } else {
                var(env::AZURE_KEY)
            };
        }
        if self.endpoint.is_none() {
            self.endpoint = if openai {
                var(env::OPENAI_BASE_URL)
            } else {
                var(env::AZURE_ENDPOINT)
            };
        }
        if self.api_version.is_none() {
            self.api_version = var(env::AZURE_VERSION);
        }
        if self.chat_deployment.is_none() {
            self.chat_deployment = var(env::CHAT_DEPLOYMENT);
        }
        if self.server_url.is_none() {
            self.server_url = var(env::SERVER_URL);
        }
        self
    }

    /// Sets the LLM provider name.
    #[must_use]
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Sets the API key.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the endpoint / base URL.
    #[must_use]
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Sets the Azure API version.
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Sets the chat deployment or model.
    #[must_use]
    pub fn chat_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.chat_deployment = Some(deployment.into());
        self
    }

    /// Sets the MCP server URL.
    #[must_use]
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = Some(url.into());
        self
    }

    /// Sets the system prompt.
    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the maximum tool-calling loop iterations.
    #[must_use]
    pub const fn max_tool_iterations(mut self, n: usize) -> Self {
        self.max_tool_iterations = Some(n);
        self
    }

    /// Sets the completion max tokens.
    #[must_use]
    pub const fn max_tokens(mut self, n: u32) -> Self {
        self.max_tokens = Some(n);
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Builds the [`AgentConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if no API key or chat deployment was set.
    pub fn build(self) -> Result<AgentConfig, ConfigError> {
        let provider = self.provider.unwrap_or_else(|| "azure".to_string());
        let api_key = self.api_key.ok_or(ConfigError::Missing {
            var: if provider == "openai" {
                env::OPENAI_KEY
            } else {
                env::AZURE_KEY
            },
        })?;
        let chat_deployment = self.chat_deployment.ok_or(ConfigError::Missing {
            var: env::CHAT_DEPLOYMENT,
        })?;

        Ok(AgentConfig {
            provider,
            api_key,
            endpoint: self.endpoint,
            api_version: self.api_version,
            chat_deployment,
            server_url: self
                .server_url
                .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
            system_prompt: self
                .system_prompt
                .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            max_tool_iterations: self
                .max_tool_iterations
                .unwrap_or(DEFAULT_MAX_TOOL_ITERATIONS),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = AgentConfig::builder()
            .api_key("test-key")
            .chat_deployment("gpt-4o")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "azure");
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
        assert_eq!(config.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.max_tool_iterations, DEFAULT_MAX_TOOL_ITERATIONS);
    }

    #[test]
    fn test_builder_missing_api_key() {
        let result = AgentConfig::builder().chat_deployment("gpt-4o").build();
        assert!(matches!(
            result,
            Err(ConfigError::Missing {
                var: env::AZURE_KEY
            })
        ));
    }

    #[test]
    fn test_builder_missing_deployment() {
        let result = AgentConfig::builder().api_key("k").build();
        assert!(matches!(
            result,
            Err(ConfigError::Missing {
                var: env::CHAT_DEPLOYMENT
            })
        ));
    }

    #[test]
    fn test_builder_custom_values() {
        let config = AgentConfig::builder()
            .api_key("key")
            .provider("openai")
            .chat_deployment("gpt-4o-mini")
            .server_url("http://10.0.0.5:8080/mcp")
            .max_tool_iterations(3)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(config.provider, "openai");
        assert_eq!(config.server_url, "http://10.0.0.5:8080/mcp");
        assert_eq!(config.max_tool_iterations, 3);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }
}
