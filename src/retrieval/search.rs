//! Hybrid search request/response types and the search service client.
//!
//! [`SearchRequest`] serialises directly to the Azure AI Search
//! `docs/search` REST body; [`SearchResponse`] deserialises its reply.
//! [`SearchBackend`] is the seam the pipeline depends on, so tests can
//! substitute canned responses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::config::SearchConfig;
use crate::error::RetrievalError;

/// Extractive answers requested alongside results.
pub const EXTRACTIVE_ANSWERS: &str = "extractive|count-5";
/// Extractive captions requested alongside results, without highlighting.
pub const EXTRACTIVE_CAPTIONS: &str = "extractive|highlight-false";

/// Query type of a search request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Semantic ranking over the retrieved candidates.
    Semantic,
}

/// Kind of a vector sub-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorQueryKind {
    /// The caller supplies a precomputed vector.
    Vector,
}

/// One nearest-neighbour sub-query over a vector field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VectorQuery {
    /// Always [`VectorQueryKind::Vector`].
    pub kind: VectorQueryKind,
    /// Query embedding.
    pub vector: Vec<f32>,
    /// Number of nearest neighbours to return.
    pub k: usize,
    /// Vector field to search.
    pub fields: String,
    /// Brute-force search instead of approximate.
    pub exhaustive: bool,
}

/// A hybrid (vector + semantic) search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Full-text query. `None` disables the keyword leg.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Vector sub-queries.
    pub vector_queries: Vec<VectorQuery>,
    /// Combined results to return.
    pub top: usize,
    /// Fields to return (`*` for all).
    pub select: String,
    /// Ranking mode.
    pub query_type: QueryType,
    /// Semantic configuration declared in the index schema.
    pub semantic_configuration: String,
    /// Text the semantic ranker scores candidates against.
    pub semantic_query: String,
    /// Extractive answers request, e.g. `extractive|count-5`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answers: Option<String>,
    /// Extractive captions request, e.g. `extractive|highlight-false`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captions: Option<String>,
}

impl SearchRequest {
    /// Builds the hybrid request for `query` and its embedding.
    ///
    /// The keyword leg is disabled; candidates come from an exhaustive
    /// vector search and are reranked semantically against `query`.
    #[must_use]
    pub fn hybrid(query: &str, vector: Vec<f32>, config: &SearchConfig) -> Self {
        Self {
            search: None,
            vector_queries: vec![VectorQuery {
                kind: VectorQueryKind::Vector,
                vector,
                k: config.k_nearest_neighbors,
                fields: config.vector_field.clone(),
                exhaustive: true,
            }],
            top: config.top,
            select: "*".to_string(),
            query_type: QueryType::Semantic,
            semantic_configuration: config.semantic_configuration.clone(),
            semantic_query: query.to_string(),
            answers: Some(EXTRACTIVE_ANSWERS.to_string()),
            captions: Some(EXTRACTIVE_CAPTIONS.to_string()),
        }
    }
}

/// Extractive caption attached to a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    /// Caption text.
    #[serde(default)]
    pub text: Option<String>,
    /// Caption with highlight markup.
    #[serde(default)]
    pub highlights: Option<String>,
}

/// Extractive answer for the whole query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticAnswer {
    /// Key of the document the answer came from.
    #[serde(default)]
    pub key: Option<String>,
    /// Answer text.
    #[serde(default)]
    pub text: Option<String>,
    /// Answer with highlight markup.
    #[serde(default)]
    pub highlights: Option<String>,
    /// Answer confidence.
    #[serde(default)]
    pub score: Option<f64>,
}

/// One document returned by the search service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Relevance score of the combined query.
    #[serde(rename = "@search.score", default)]
    pub score: Option<f64>,
    /// Semantic reranker score.
    #[serde(rename = "@search.rerankerScore", default)]
    pub reranker_score: Option<f64>,
    /// Extractive captions.
    #[serde(rename = "@search.captions", default)]
    pub captions: Option<Vec<Caption>>,
    /// Remaining document fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl SearchDocument {
    /// Returns the value of `field` rendered as text.
    ///
    /// Strings are returned as-is; other JSON values use their JSON text.
    /// `None` when the field is absent or null.
    #[must_use]
    pub fn field_text(&self, field: &str) -> Option<String> {
        match self.fields.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Body of a search response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Results in service order.
    #[serde(default)]
    pub value: Vec<SearchDocument>,
    /// Extractive answers, when requested.
    #[serde(rename = "@search.answers", default)]
    pub answers: Option<Vec<SemanticAnswer>>,
}

/// Trait for search service backends.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Executes a search request.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError`] on transport failures, non-success
    /// responses, or undecodable bodies.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, RetrievalError>;
}

/// Azure AI Search REST client for a single index.
pub struct AzureSearchClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl AzureSearchClient {
    /// Creates a client for the index named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RetrievalError::SearchRequest`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &SearchConfig) -> Result<Self, RetrievalError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::SearchRequest {
                message: e.to_string(),
            })?;

        Ok(Self {
            http,
            url: search_url(config),
            api_key: config.search_key.clone(),
        })
    }
}

/// Builds the `docs/search` URL for the configured index.
fn search_url(config: &SearchConfig) -> String {
    format!(
        "{}/indexes/{}/docs/search?api-version={}",
        config.search_endpoint.trim_end_matches('/'),
        config.index_name,
        config.search_api_version,
    )
}

impl std::fmt::Debug for AzureSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureSearchClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SearchBackend for AzureSearchClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, RetrievalError> {
        let response = self
            .http
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| RetrievalError::SearchRequest {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RetrievalError::SearchStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| RetrievalError::SearchDecode {
                message: e.to_string(),
            })
    }
}
