//! Query embedding.
//!
//! [`Embedder`] turns a query into a single vector. The production
//! implementation calls an Azure OpenAI embeddings deployment through
//! `async-openai`.

use std::time::Duration;

use async_openai::Client;
use async_openai::config::AzureConfig;
use async_openai::types::CreateEmbeddingRequestArgs;
use async_trait::async_trait;

use super::config::SearchConfig;
use crate::error::RetrievalError;

/// Trait for embedding backends.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds `text`, returning the first vector the service produced.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Embedding`] when the call fails and
    /// [`RetrievalError::EmptyEmbedding`] when it yields no vectors.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;
}

/// Retry policy for `async-openai` clients: give up after the first failure.
///
/// The library's default backoff retries rate limits and server errors for
/// up to fifteen minutes; failures here surface to the caller immediately.
pub(crate) fn no_retry() -> backoff::ExponentialBackoff {
    backoff::ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// Azure OpenAI embeddings client bound to one deployment.
pub struct AzureOpenAiEmbedder {
    client: Client<AzureConfig>,
    deployment: String,
}

impl AzureOpenAiEmbedder {
    /// Creates an embedder from the retrieval configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Embedding`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &SearchConfig) -> Result<Self, RetrievalError> {
        let azure = AzureConfig::new()
            .with_api_base(&config.embedding_endpoint)
            .with_api_version(&config.embedding_api_version)
            .with_deployment_id(&config.embedding_deployment)
            .with_api_key(&config.embedding_key);

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::Embedding {
                message: e.to_string(),
            })?;

        Ok(Self {
            client: Client::with_config(azure)
                .with_http_client(http)
                .with_backoff(no_retry()),
            deployment: config.embedding_deployment.clone(),
        })
    }
}

impl std::fmt::Debug for AzureOpenAiEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiEmbedder")
            .field("client", &"<async-openai::Client>")
            .field("deployment", &self.deployment)
            .finish()
    }
}

#[async_trait]
impl Embedder for AzureOpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(self.deployment.as_str())
            .input(text.to_string())
            .build()
            .map_err(|e| RetrievalError::Embedding {
                message: e.to_string(),
            })?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| RetrievalError::Embedding {
                message: e.to_string(),
            })?;

        response
            .data
            .into_iter()
            .next()
            .map(|e| e.embedding)
            .ok_or_else(|| RetrievalError::EmptyEmbedding {
                deployment: self.deployment.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::config::tests::complete_builder;

    #[test]
    fn test_new_from_config() {
        let config = complete_builder()
            .build()
            .unwrap_or_else(|_| unreachable!());
        let embedder = AzureOpenAiEmbedder::new(&config).unwrap_or_else(|_| unreachable!());
        assert_eq!(embedder.deployment, "text-embedding-ada-002");
        assert!(format!("{embedder:?}").contains("text-embedding-ada-002"));
    }

    fn embedder_for(endpoint: &str) -> AzureOpenAiEmbedder {
        let config = complete_builder()
            .embedding_endpoint(endpoint)
            .build()
            .unwrap_or_else(|_| unreachable!());
        AzureOpenAiEmbedder::new(&config).unwrap_or_else(|_| unreachable!())
    }

    fn embeddings_body(data: &serde_json::Value) -> String {
        serde_json::json!({
            "object": "list",
            "data": data,
            "model": "text-embedding-ada-002",
            "usage": {"prompt_tokens": 3, "total_tokens": 3}
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_embed_returns_first_vector() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/openai/deployments/text-embedding-ada-002/embeddings",
            )
            .match_query(mockito::Matcher::UrlEncoded(
                "api-version".into(),
                "2024-02-01".into(),
            ))
            .match_header("api-key", "openai-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(embeddings_body(&serde_json::json!([
                {"object": "embedding", "index": 0, "embedding": [0.25, -0.5]},
                {"object": "embedding", "index": 1, "embedding": [1.0, 1.0]}
            ])))
            .create_async()
            .await;

        let vector = embedder_for(&server.url()).embed("vpn keeps dropping").await;

        mock.assert_async().await;
        assert_eq!(vector.unwrap_or_default(), vec![0.25, -0.5]);
    }

    #[tokio::test]
    async fn test_embed_empty_data_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                "/openai/deployments/text-embedding-ada-002/embeddings",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(embeddings_body(&serde_json::json!([])))
            .create_async()
            .await;

        let err = embedder_for(&server.url()).embed("q").await.err();
        assert!(matches!(err, Some(RetrievalError::EmptyEmbedding { .. })));
    }

    #[tokio::test]
    async fn test_embed_auth_failure_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                "/openai/deployments/text-embedding-ada-002/embeddings",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"Access denied","type":"invalid_request_error","param":null,"code":"401"}}"#)
            .create_async()
            .await;

        let err = embedder_for(&server.url()).embed("q").await.err();
        assert!(matches!(err, Some(RetrievalError::Embedding { .. })));
    }

    #[tokio::test]
    async fn test_embed_rate_limit_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/openai/deployments/text-embedding-ada-002/embeddings",
            )
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"Rate limit exceeded","type":"rate_limit_exceeded","param":null,"code":"429"}}"#)
            .expect(1)
            .create_async()
            .await;

        let embedder = embedder_for(&server.url());
        let outcome = tokio::time::timeout(Duration::from_secs(5), embedder.embed("q")).await;

        let err = outcome.unwrap_or_else(|_| unreachable!()).err();
        assert!(matches!(err, Some(RetrievalError::Embedding { .. })));
        mock.assert_async().await;
    }

    #[test]
    fn test_no_retry_has_zero_budget() {
        assert_eq!(no_retry().max_elapsed_time, Some(Duration::ZERO));
    }
}
