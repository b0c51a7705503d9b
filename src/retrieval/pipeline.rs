//! The retrieval pipeline: embed → hybrid search → filter/format.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::config::SearchConfig;
use super::embedding::{AzureOpenAiEmbedder, Embedder};
use super::format::format_results;
use super::search::{AzureSearchClient, SearchBackend, SearchRequest};
use crate::error::RetrievalError;

/// Runs a query through the embedding and search services and formats the
/// results for a language model's context.
///
/// Holds no mutable state; one instance serves concurrent callers.
pub struct RetrievalPipeline {
    embedder: Arc<dyn Embedder>,
    search: Arc<dyn SearchBackend>,
    config: SearchConfig,
}

impl RetrievalPipeline {
    /// Creates a pipeline over explicit backends.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        search: Arc<dyn SearchBackend>,
        config: SearchConfig,
    ) -> Self {
        Self {
            embedder,
            search,
            config,
        }
    }

    /// Creates a pipeline backed by Azure OpenAI and Azure AI Search.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if either HTTP client cannot be built.
    pub fn from_config(config: SearchConfig) -> Result<Self, RetrievalError> {
        let embedder = AzureOpenAiEmbedder::new(&config)?;
        let search = AzureSearchClient::new(&config)?;
        Ok(Self::new(Arc::new(embedder), Arc::new(search), config))
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs the pipeline to completion.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] if the embedding or search call fails.
    pub async fn retrieve(&self, query: &str) -> Result<String, RetrievalError> {
        self.retrieve_with_cancel(query, &CancellationToken::new())
            .await
    }

    /// Runs the pipeline, abandoning in-flight calls once `cancel` fires.
    ///
    /// # Steps
    ///
    /// 1. Embed `query`
    /// 2. Hybrid search with the embedding and `query` as semantic text
    /// 3. Drop results below the reranker threshold and format the rest
    ///
    /// The search call is never issued without a successful embedding.
    /// Zero qualifying results yields `Ok("")`.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::Cancelled`] if `cancel` fires first, or the
    /// upstream error from either call.
    pub async fn retrieve_with_cancel(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<String, RetrievalError> {
        let vector = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RetrievalError::Cancelled),
            result = self.embedder.embed(query) => result?,
        };
        debug!(dimensions = vector.len(), "query embedded");

        let request = SearchRequest::hybrid(query, vector, &self.config);
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(RetrievalError::Cancelled),
            result = self.search.search(&request) => result?,
        };
        debug!(
            results = response.value.len(),
            answers = response.answers.as_ref().map_or(0, Vec::len),
            "search completed"
        );

        let formatted = format_results(
            &response.value,
            &self.config.content_field,
            self.config.reranker_threshold,
        );
        let stats = formatted.stats;

        if stats.missing_reranker > 0 {
            warn!(
                count = stats.missing_reranker,
                "results without a reranker score were treated as 0"
            );
        }
        if stats.missing_content > 0 {
            warn!(
                count = stats.missing_content,
                field = %self.config.content_field,
                "kept results missing the content field"
            );
        }
        debug!(
            kept = stats.kept,
            threshold = self.config.reranker_threshold,
            "results filtered"
        );

        Ok(formatted.text)
    }
}

impl std::fmt::Debug for RetrievalPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::retrieval::config::tests::complete_builder;
    use crate::retrieval::search::{SearchDocument, SearchResponse};

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    /// Mock embedder returning a fixed vector, an error, or never completing.
    enum EmbedBehavior {
        Vector(Vec<f32>),
        Fail,
        Hang,
    }

    struct MockEmbedder {
        behavior: EmbedBehavior,
        calls: AtomicUsize,
    }

    impl MockEmbedder {
        fn new(behavior: EmbedBehavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Embedder for MockEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, RetrievalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                EmbedBehavior::Vector(v) => Ok(v.clone()),
                EmbedBehavior::Fail => Err(RetrievalError::Embedding {
                    message: "429 Too Many Requests".to_string(),
                }),
                EmbedBehavior::Hang => std::future::pending().await,
            }
        }
    }

    /// Mock search backend returning a canned response and recording requests.
    struct MockSearch {
        response: Result<SearchResponse, u16>,
        calls: AtomicUsize,
        last_request: Mutex<Option<SearchRequest>>,
    }

    impl MockSearch {
        fn new(response: Result<SearchResponse, u16>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }

        fn with_scores(scores: &[Option<f64>]) -> Arc<Self> {
            let value = scores
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    serde_json::from_value::<SearchDocument>(json!({
                        "@search.score": 0.01,
                        "@search.rerankerScore": s,
                        "chunk": format!("doc {i}")
                    }))
                    .unwrap_or_else(|e| panic!("bad fixture: {e}"))
                })
                .collect();
            Self::new(Ok(SearchResponse {
                value,
                answers: None,
            }))
        }
    }

    #[async_trait]
    impl SearchBackend for MockSearch {
        async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, RetrievalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut slot) = self.last_request.lock() {
                *slot = Some(request.clone());
            }
            self.response
                .clone()
                .map_err(|status| RetrievalError::SearchStatus {
                    status,
                    body: "error".to_string(),
                })
        }
    }

    fn pipeline(embedder: Arc<MockEmbedder>, search: Arc<MockSearch>) -> RetrievalPipeline {
        let config = complete_builder()
            .build()
            .unwrap_or_else(|_| unreachable!());
        RetrievalPipeline::new(embedder, search, config)
    }

    #[tokio::test]
    async fn test_filters_and_numbers_results() {
        let search = MockSearch::with_scores(&[Some(2.0), Some(1.5), Some(1.4), Some(0.0)]);
        let p = pipeline(
            MockEmbedder::new(EmbedBehavior::Vector(vec![0.1, 0.2])),
            Arc::clone(&search),
        );

        let out = p
            .retrieve("printer offline")
            .await
            .unwrap_or_else(|e| panic!("retrieve failed: {e}"));

        assert_eq!(out.matches("Source ").count(), 2);
        assert!(out.starts_with("Source 1\nContent: doc 0\n"));
        assert!(out.contains("Source 2\nContent: doc 1\n"));
        assert!(!out.contains("doc 2"));
        assert!(!out.contains("doc 3"));
    }

    #[tokio::test]
    async fn test_zero_results_is_empty_string() {
        let p = pipeline(
            MockEmbedder::new(EmbedBehavior::Vector(vec![0.1])),
            MockSearch::new(Ok(SearchResponse::default())),
        );
        let out = p.retrieve("anything").await;
        assert_eq!(out.ok().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_missing_reranker_score_excluded() {
        let p = pipeline(
            MockEmbedder::new(EmbedBehavior::Vector(vec![0.1])),
            MockSearch::with_scores(&[None]),
        );
        let out = p.retrieve("q").await;
        assert_eq!(out.ok().as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_identical_responses_identical_output() {
        let p = pipeline(
            MockEmbedder::new(EmbedBehavior::Vector(vec![0.3, 0.4])),
            MockSearch::with_scores(&[Some(3.1), Some(1.2), Some(2.7)]),
        );
        let first = p.retrieve("same").await.unwrap_or_default();
        let second = p.retrieve("same").await.unwrap_or_default();
        assert!(!first.is_empty());
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[tokio::test]
    async fn test_embedding_failure_skips_search() {
        let embedder = MockEmbedder::new(EmbedBehavior::Fail);
        let search = MockSearch::with_scores(&[Some(2.0)]);
        let p = pipeline(Arc::clone(&embedder), Arc::clone(&search));

        let err = p.retrieve("q").await.err();

        assert!(matches!(err, Some(RetrievalError::Embedding { .. })));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let p = pipeline(
            MockEmbedder::new(EmbedBehavior::Vector(vec![0.1])),
            MockSearch::new(Err(404)),
        );
        let err = p.retrieve("q").await.err();
        assert!(matches!(
            err,
            Some(RetrievalError::SearchStatus { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_search_request_uses_configuration() {
        let search = MockSearch::new(Ok(SearchResponse::default()));
        let p = pipeline(
            MockEmbedder::new(EmbedBehavior::Vector(vec![0.5, 0.6, 0.7])),
            Arc::clone(&search),
        );
        let _ = p.retrieve("  ").await;

        let request = search
            .last_request
            .lock()
            .ok()
            .and_then(|r| r.clone())
            .unwrap_or_else(|| panic!("search was not called"));

        assert!(request.search.is_none());
        assert_eq!(request.semantic_query, "  ");
        assert_eq!(request.semantic_configuration, "itsupport-semantic");
        assert_eq!(request.top, 5);
        assert_eq!(request.vector_queries.len(), 1);
        assert_eq!(request.vector_queries[0].vector, vec![0.5, 0.6, 0.7]);
        assert_eq!(request.vector_queries[0].fields, "text_vector");
        assert_eq!(request.vector_queries[0].k, 5);
        assert!(request.vector_queries[0].exhaustive);
    }

    #[tokio::test]
    async fn test_cancellation_during_embedding() {
        let search = MockSearch::with_scores(&[Some(2.0)]);
        let p = pipeline(
            MockEmbedder::new(EmbedBehavior::Hang),
            Arc::clone(&search),
        );

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let err = p.retrieve_with_cancel("q", &cancel).await.err();
        assert!(matches!(err, Some(RetrievalError::Cancelled)));
        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_already_cancelled_token() {
        let embedder = MockEmbedder::new(EmbedBehavior::Vector(vec![0.1]));
        let p = pipeline(Arc::clone(&embedder), MockSearch::with_scores(&[]));

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = p.retrieve_with_cancel("q", &cancel).await.err();
        assert!(matches!(err, Some(RetrievalError::Cancelled)));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
    }
}
