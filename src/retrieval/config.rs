//! Retrieval configuration with builder pattern and environment variable support.
//!
//! Configuration is resolved in order: explicit values → environment variables → defaults.
//! Every service binding (endpoints, keys, index, field names, semantic
//! configuration) is required; [`SearchConfigBuilder::build`] rejects a
//! missing one up front instead of letting the first upstream call fail.

use std::time::Duration;

use crate::error::ConfigError;

/// Number of combined results requested from the search service.
pub const DEFAULT_TOP: usize = 5;
/// Nearest neighbours requested by the vector sub-query.
pub const DEFAULT_K_NEAREST_NEIGHBORS: usize = 5;
/// Minimum reranker score for a result to be included in the output.
pub const DEFAULT_RERANKER_THRESHOLD: f64 = 1.5;
/// Search REST API version.
pub const DEFAULT_SEARCH_API_VERSION: &str = "2024-07-01";
/// Default outbound request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Environment variable names.
pub mod env {
    /// Search service endpoint URL.
    pub const SEARCH_ENDPOINT: &str = "AZURE_SEARCH_ENDPOINT";
    /// Search service access key.
    pub const SEARCH_KEY: &str = "AZURE_SEARCH_KEY";
    /// Search index name.
    pub const SEARCH_INDEX: &str = "AZURE_SEARCH_INDEX";
    /// Name of the vector field.
    pub const VECTOR_FIELD: &str = "AZURE_SEARCH_VECTOR_FIELD_NAME";
    /// Name of the content field.
    pub const CONTENT_FIELD: &str = "AZURE_SEARCH_CONTENT_FIELD_NAME";
    /// Semantic ranking configuration bound to the index.
    pub const SEMANTIC_CONFIGURATION: &str = "AZURE_SEARCH_SEMANTIC_CONFIGURATION";
    /// Search REST API version override.
    pub const SEARCH_API_VERSION: &str = "AZURE_SEARCH_API_VERSION";
    /// Reranker threshold override.
    pub const RERANKER_THRESHOLD: &str = "AZURE_SEARCH_RERANKER_THRESHOLD";
    /// Azure OpenAI endpoint URL.
    pub const OPENAI_ENDPOINT: &str = "AZURE_OPENAI_ENDPOINT";
    /// Azure OpenAI access key.
    pub const OPENAI_KEY: &str = "AZURE_OPENAI_KEY";
    /// Azure OpenAI API version.
    pub const OPENAI_VERSION: &str = "AZURE_OPENAI_VERSION";
    /// Embedding model deployment.
    pub const EMBEDDINGS_DEPLOYMENT: &str = "AZURE_EMBEDDINGS_DEPLOYMENT";
}

/// Immutable configuration for one retrieval pipeline.
#[derive(Clone)]
pub struct SearchConfig {
    /// Search service endpoint, e.g. `https://my-search.search.windows.net`.
    pub search_endpoint: String,
    /// Search service access key, sent as the `api-key` header.
    pub search_key: String,
    /// Index to query.
    pub index_name: String,
    /// Field holding document embeddings.
    pub vector_field: String,
    /// Field holding display content.
    pub content_field: String,
    /// Semantic ranking configuration declared in the index schema.
    pub semantic_configuration: String,
    /// Search REST API version.
    pub search_api_version: String,
    /// Azure OpenAI endpoint for embeddings.
    pub embedding_endpoint: String,
    /// Azure OpenAI access key.
    pub embedding_key: String,
    /// Azure OpenAI API version.
    pub embedding_api_version: String,
    /// Embedding model deployment name.
    pub embedding_deployment: String,
    /// Results below this reranker score are dropped.
    pub reranker_threshold: f64,
    /// Combined results requested.
    pub top: usize,
    /// Nearest neighbours requested by the vector leg.
    pub k_nearest_neighbors: usize,
    /// Timeout applied to each outbound HTTP request.
    pub timeout: Duration,
}

impl std::fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConfig")
            .field("search_endpoint", &self.search_endpoint)
            .field("search_key", &"<redacted>")
            .field("index_name", &self.index_name)
            .field("vector_field", &self.vector_field)
            .field("content_field", &self.content_field)
            .field("semantic_configuration", &self.semantic_configuration)
            .field("search_api_version", &self.search_api_version)
            .field("embedding_endpoint", &self.embedding_endpoint)
            .field("embedding_key", &"<redacted>")
            .field("embedding_api_version", &self.embedding_api_version)
            .field("embedding_deployment", &self.embedding_deployment)
            .field("reranker_threshold", &self.reranker_threshold)
            .field("top", &self.top)
            .field("k_nearest_neighbors", &self.k_nearest_neighbors)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SearchConfig {
    /// Creates a new builder for `SearchConfig`.
    #[must_use]
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }

    /// Creates configuration from environment variables with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first unset required
    /// variable, or [`ConfigError::Invalid`] for an unparsable override.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::builder().from_env()?.build()
    }
}

/// Builder for [`SearchConfig`].
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    search_endpoint: Option<String>,
    search_key: Option<String>,
    index_name: Option<String>,
    vector_field: Option<String>,
    content_field: Option<String>,
    semantic_configuration: Option<String>,
    search_api_version: Option<String>,
    embedding_endpoint: Option<String>,
    embedding_key: Option<String>,
    embedding_api_version: Option<String>,
    embedding_deployment: Option<String>,
    reranker_threshold: Option<f64>,
    top: Option<usize>,
    k_nearest_neighbors: Option<usize>,
    timeout: Option<Duration>,
}

/// Reads a variable, treating an empty value as unset.
fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parses a reranker threshold, rejecting `NaN` and infinities.
fn parse_threshold(raw: &str) -> Result<f64, ConfigError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| ConfigError::Invalid {
            var: env::RERANKER_THRESHOLD,
            message: e.to_string(),
        })?;
    check_threshold(value)
}

/// Rejects `NaN` and infinities.
fn check_threshold(value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::Invalid {
            var: env::RERANKER_THRESHOLD,
            message: format!("threshold must be a finite number, got {value}"),
        })
    }
}

impl SearchConfigBuilder {
    /// Populates unset fields from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the reranker threshold override
    /// is not a finite number.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        let fill = |slot: &mut Option<String>, name: &str| {
            if slot.is_none() {
                *slot = var(name);
            }
        };
        fill(&mut self.search_endpoint, env::SEARCH_ENDPOINT);
        fill(&mut self.search_key, env::SEARCH_KEY);
        fill(&mut self.index_name, env::SEARCH_INDEX);
        fill(&mut self.vector_field, env::VECTOR_FIELD);
        fill(&mut self.content_field, env::CONTENT_FIELD);
        fill(&mut self.semantic_configuration, env::SEMANTIC_CONFIGURATION);
        fill(&mut self.search_api_version, env::SEARCH_API_VERSION);
        fill(&mut self.embedding_endpoint, env::OPENAI_ENDPOINT);
        fill(&mut self.embedding_key, env::OPENAI_KEY);
        fill(&mut self.embedding_api_version, env::OPENAI_VERSION);
        fill(&mut self.embedding_deployment, env::EMBEDDINGS_DEPLOYMENT);

        if self.reranker_threshold.is_none()
            && let Some(raw) = var(env::RERANKER_THRESHOLD)
        {
            self.reranker_threshold = Some(parse_threshold(&raw)?);
        }
        Ok(self)
    }

    /// Sets the search endpoint.
    #[must_use]
    pub fn search_endpoint(mut self, url: impl Into<String>) -> Self {
        self.search_endpoint = Some(url.into());
        self
    }

    /// Sets the search access key.
    #[must_use]
    pub fn search_key(mut self, key: impl Into<String>) -> Self {
        self.search_key = Some(key.into());
        self
    }

    /// Sets the index name.
    #[must_use]
    pub fn index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = Some(name.into());
        self
    }

    /// Sets the vector field name.
    #[must_use]
    pub fn vector_field(mut self, name: impl Into<String>) -> Self {
        self.vector_field = Some(name.into());
        self
    }

    /// Sets the content field name.
    #[must_use]
    pub fn content_field(mut self, name: impl Into<String>) -> Self {
        self.content_field = Some(name.into());
        self
    }

    /// Sets the semantic configuration name.
    #[must_use]
    pub fn semantic_configuration(mut self, name: impl Into<String>) -> Self {
        self.semantic_configuration = Some(name.into());
        self
    }

    /// Sets the search REST API version.
    #[must_use]
    pub fn search_api_version(mut self, version: impl Into<String>) -> Self {
        self.search_api_version = Some(version.into());
        self
    }

    /// Sets the embedding endpoint.
    #[must_use]
    pub fn embedding_endpoint(mut self, url: impl Into<String>) -> Self {
        self.embedding_endpoint = Some(url.into());
        self
    }

    /// Sets the embedding access key.
    #[must_use]
    pub fn embedding_key(mut self, key: impl Into<String>) -> Self {
        self.embedding_key = Some(key.into());
        self
    }

    /// Sets the embedding API version.
    #[must_use]
    pub fn embedding_api_version(mut self, version: impl Into<String>) -> Self {
        self.embedding_api_version = Some(version.into());
        self
    }

    /// Sets the embedding deployment.
    #[must_use]
    pub fn embedding_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.embedding_deployment = Some(deployment.into());
        self
    }

    /// Sets the reranker threshold.
    #[must_use]
    pub const fn reranker_threshold(mut self, threshold: f64) -> Self {
        self.reranker_threshold = Some(threshold);
        self
    }

    /// Sets the number of combined results.
    #[must_use]
    pub const fn top(mut self, n: usize) -> Self {
        self.top = Some(n);
        self
    }

    /// Sets the vector leg's nearest-neighbour count.
    #[must_use]
    pub const fn k_nearest_neighbors(mut self, n: usize) -> Self {
        self.k_nearest_neighbors = Some(n);
        self
    }

    /// Sets the outbound request timeout.
    #[must_use]
    pub const fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Builds the [`SearchConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for the first required value that
    /// was not set.
    pub fn build(self) -> Result<SearchConfig, ConfigError> {
        let required = |value: Option<String>, var: &'static str| {
            value.ok_or(ConfigError::Missing { var })
        };

        Ok(SearchConfig {
            search_endpoint: required(self.search_endpoint, env::SEARCH_ENDPOINT)?,
            search_key: required(self.search_key, env::SEARCH_KEY)?,
            index_name: required(self.index_name, env::SEARCH_INDEX)?,
            vector_field: required(self.vector_field, env::VECTOR_FIELD)?,
            content_field: required(self.content_field, env::CONTENT_FIELD)?,
            semantic_configuration: required(
                self.semantic_configuration,
                env::SEMANTIC_CONFIGURATION,
            )?,
            search_api_version: self
                .search_api_version
                .unwrap_or_else(|| DEFAULT_SEARCH_API_VERSION.to_string()),
            embedding_endpoint: required(self.embedding_endpoint, env::OPENAI_ENDPOINT)?,
            embedding_key: required(self.embedding_key, env::OPENAI_KEY)?,
            embedding_api_version: required(self.embedding_api_version, env::OPENAI_VERSION)?,
            embedding_deployment: required(
                self.embedding_deployment,
                env::EMBEDDINGS_DEPLOYMENT,
            )?,
            reranker_threshold: check_threshold(
                self.reranker_threshold
                    .unwrap_or(DEFAULT_RERANKER_THRESHOLD),
            )?,
            top: self.top.unwrap_or(DEFAULT_TOP),
            k_nearest_neighbors: self
                .k_nearest_neighbors
                .unwrap_or(DEFAULT_K_NEAREST_NEIGHBORS),
            timeout: self
                .timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        })
    }
}
