//! Provider registry and factory.
//!
//! Maps provider names to concrete [`LlmProvider`] implementations.

use crate::agent::config::AgentConfig;
use crate::agent::provider::LlmProvider;
use crate::agent::providers::OpenAiProvider;
use crate::error::ConfigError;

/// Creates an [`LlmProvider`] based on the configured provider name.
///
/// # Supported Providers
///
/// - `"azure"` (default): Azure OpenAI chat deployments via `async-openai`
/// - `"openai"`: `OpenAI`-compatible APIs via `async-openai`
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for unknown provider names and
/// [`ConfigError::Missing`] when Azure settings are absent, and
/// [`ConfigError::HttpClient`] if the HTTP client cannot be built.
pub fn create_provider(config: &AgentConfig) -> Result<Box<dyn LlmProvider>, ConfigError> {
    match config.provider.as_str() {
        "azure" => Ok(Box::new(OpenAiProvider::azure(config)?)),
        "openai" => Ok(Box::new(OpenAiProvider::openai(config)?)),
        other => Err(ConfigError::Invalid {
            var: crate::agent::config::env::PROVIDER,
            message: format!("unsupported provider: {other}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> crate::agent::config::AgentConfigBuilder {
        AgentConfig::builder()
            .api_key("test")
            .endpoint("https://openai.example.net")
            .api_version("2024-10-21")
            .chat_deployment("gpt-4o")
    }

    #[test]
    fn test_create_azure_provider() {
        let config = builder().build().unwrap_or_else(|_| unreachable!());
        let provider = create_provider(&config);
        assert_eq!(provider.map(|p| p.name()).ok(), Some("azure"));
    }

    #[test]
    fn test_create_openai_provider() {
        let config = builder()
            .provider("openai")
            .build()
            .unwrap_or_else(|_| unreachable!());
        let provider = create_provider(&config);
        assert_eq!(provider.map(|p| p.name()).ok(), Some("openai"));
    }

    #[test]
    fn test_create_unknown_provider() {
        let config = builder()
            .provider("unknown")
            .build()
            .unwrap_or_else(|_| unreachable!());
        assert!(create_provider(&config).is_err());
    }
}
