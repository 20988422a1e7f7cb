//! Pinecone-backed vector index and embedding provider.
//!
//! This module is only available when the `pinecone` feature is enabled.
//! It talks to two Pinecone surfaces with `reqwest`:
//!
//! - [`PineconeIndex`] — the data-plane `/query` endpoint of one index,
//!   implementing [`VectorIndex`].
//! - [`PineconeEmbeddings`] — the Inference API `/embed` endpoint,
//!   implementing [`EmbeddingProvider`] with honest query/passage modes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::document::{ChunkMetadata, Match};
use crate::embedding::{EmbeddingMode, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorIndex;

/// The Pinecone Inference API embed endpoint.
const PINECONE_EMBED_URL: &str = "https://api.pinecone.io/embed";

/// The default Pinecone inference embedding model.
const DEFAULT_EMBED_MODEL: &str = "llama-text-embed-v2";

/// The default dimensionality for `llama-text-embed-v2`.
const DEFAULT_DIMENSIONS: usize = 1024;

/// API version header required by the Pinecone REST surfaces.
const API_VERSION_HEADER: (&str, &str) = ("X-Pinecone-API-Version", "2025-01");

#[derive(Deserialize)]
struct PineconeErrorResponse {
    error: PineconeErrorDetail,
}

#[derive(Deserialize)]
struct PineconeErrorDetail {
    message: String,
}

/// Extract a human-readable message from a Pinecone error body.
fn error_detail(body: String) -> String {
    serde_json::from_str::<PineconeErrorResponse>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}

// ── Vector index ───────────────────────────────────────────────────

/// A [`VectorIndex`] backed by one Pinecone index's data plane.
///
/// # Example
///
/// ```rust,ignore
/// use tactics_rag::pinecone::PineconeIndex;
///
/// let index = PineconeIndex::new(
///     "pc-...",
///     "https://tactics-knowledge-abc123.svc.aped-4627-b74a.pinecone.io",
/// )?;
/// let matches = index.search(&query_embedding, 1000, true).await?;
/// ```
pub struct PineconeIndex {
    client: reqwest::Client,
    api_key: String,
    host: String,
    namespace: Option<String>,
}

impl PineconeIndex {
    /// Create a new index handle for the given API key and index host URL.
    pub fn new(api_key: impl Into<String>, host: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError("Pinecone API key must not be empty".into()));
        }
        let host = host.into().trim_end_matches('/').to_string();
        if host.is_empty() {
            return Err(RagError::ConfigError("Pinecone index host must not be empty".into()));
        }

        Ok(Self { client: reqwest::Client::new(), api_key, host, namespace: None })
    }

    /// Create a new index handle using the `PINECONE_API_KEY` environment
    /// variable.
    pub fn from_env(host: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("PINECONE_API_KEY").map_err(|_| {
            RagError::ConfigError("PINECONE_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key, host)
    }

    /// Restrict queries to a namespace (default namespace when unset).
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<&'a str>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<Value>,
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<Match>> {
        debug!(backend = "Pinecone", top_k, "querying index");

        let request_body = QueryRequest {
            vector: embedding,
            top_k,
            include_metadata,
            namespace: self.namespace.as_deref(),
        };

        let response = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .header(API_VERSION_HEADER.0, API_VERSION_HEADER.1)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(backend = "Pinecone", error = %e, "query request failed");
                RagError::VectorIndexError {
                    backend: "Pinecone".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(backend = "Pinecone", %status, "query API error");
            return Err(RagError::VectorIndexError {
                backend: "Pinecone".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let query_response: QueryResponse = response.json().await.map_err(|e| {
            error!(backend = "Pinecone", error = %e, "failed to parse query response");
            RagError::VectorIndexError {
                backend: "Pinecone".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        Ok(query_response
            .matches
            .into_iter()
            .map(|m| Match {
                id: m.id,
                score: m.score,
                metadata: m.metadata.and_then(ChunkMetadata::from_value),
            })
            .collect())
    }
}

// ── Embedding provider ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the Pinecone Inference API.
///
/// The `input_type` parameter is derived from [`EmbeddingMode`], so vectors
/// produced here in query mode match an index populated in passage mode by
/// the ingestion side.
pub struct PineconeEmbeddings {
    client: reqwest::Client,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl PineconeEmbeddings {
    /// Create a new provider with the given API key and the default
    /// `llama-text-embed-v2` model.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(RagError::ConfigError("Pinecone API key must not be empty".into()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model: DEFAULT_EMBED_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    /// Create a new provider using the `PINECONE_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PINECONE_API_KEY").map_err(|_| {
            RagError::ConfigError("PINECONE_API_KEY environment variable not set".into())
        })?;
        Self::new(api_key)
    }

    /// Set the inference model and its output dimensionality.
    pub fn with_model(mut self, model: impl Into<String>, dimensions: usize) -> Self {
        self.model = model.into();
        self.dimensions = dimensions;
        self
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    parameters: EmbedParameters<'a>,
    inputs: Vec<EmbedInput<'a>>,
}

#[derive(Serialize)]
struct EmbedParameters<'a> {
    input_type: &'a str,
}

#[derive(Serialize)]
struct EmbedInput<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for PineconeEmbeddings {
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> Result<Vec<f32>> {
        debug!(
            provider = "Pinecone",
            model = %self.model,
            mode = mode.as_str(),
            text_len = text.len(),
            "embedding text"
        );

        let request_body = EmbedRequest {
            model: &self.model,
            parameters: EmbedParameters { input_type: mode.as_str() },
            inputs: vec![EmbedInput { text }],
        };

        let response = self
            .client
            .post(PINECONE_EMBED_URL)
            .header("Api-Key", &self.api_key)
            .header(API_VERSION_HEADER.0, API_VERSION_HEADER.1)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Pinecone", error = %e, "embed request failed");
                RagError::EmbeddingError {
                    provider: "Pinecone".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = error_detail(response.text().await.unwrap_or_default());
            error!(provider = "Pinecone", %status, "embed API error");
            return Err(RagError::EmbeddingError {
                provider: "Pinecone".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = "Pinecone", error = %e, "failed to parse embed response");
            RagError::EmbeddingError {
                provider: "Pinecone".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        embed_response.data.into_iter().next().map(|d| d.values).ok_or_else(|| {
            RagError::EmbeddingError {
                provider: "Pinecone".into(),
                message: "API returned empty response".into(),
            }
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
