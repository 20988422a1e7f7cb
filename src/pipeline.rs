//! Query pipeline orchestrator.
//!
//! The [`QueryPipeline`] sequences expansion → retrieval → synthesis by
//! composing an [`EmbeddingProvider`], a [`VectorIndex`], and a
//! [`GenerationModel`]. Each handle is a long-lived, stateless, thread-safe
//! service owned by process-wide configuration and injected here; the
//! pipeline itself holds no per-query state, so one instance serves
//! concurrent queries.
//!
//! # Example
//!
//! ```rust,ignore
//! use tactics_rag::{PipelineConfig, QueryPipeline};
//!
//! let pipeline = QueryPipeline::builder()
//!     .config(PipelineConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_index(Arc::new(index))
//!     .generation_model(Arc::new(model))
//!     .build()?;
//!
//! let result = pipeline.answer_query("5费卡有哪些").await?;
//! println!("{}", result.answer);
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::document::AnswerResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::expansion::QueryExpander;
use crate::generation::GenerationModel;
use crate::retriever::Retriever;
use crate::synthesis::AnswerSynthesizer;
use crate::vectorstore::VectorIndex;

/// The retrieval-augmented query pipeline.
///
/// One invocation runs four sequential stages:
///
/// 1. validation — empty queries are a [`RagError::ConfigError`];
/// 2. expansion — best-effort, never fatal;
/// 3. retrieval — per-candidate best-effort; zero successful searches
///    degrade to the no-context sentinel rather than aborting;
/// 4. synthesis — fatal on failure.
///
/// There are no retries here; retry policy, if any, belongs to the client
/// layer behind the injected handles.
pub struct QueryPipeline {
    config: PipelineConfig,
    expander: QueryExpander,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
}

impl QueryPipeline {
    /// Create a new [`QueryPipelineBuilder`].
    pub fn builder() -> QueryPipelineBuilder {
        QueryPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Answer one user query: expand → retrieve → synthesize.
    ///
    /// The returned future is cancel-safe: dropping it aborts in-flight
    /// expansion, embedding, and search sub-calls, and no partial result is
    /// observable. For deadline-based cancellation see
    /// [`answer_query_with_timeout`](Self::answer_query_with_timeout).
    ///
    /// # Errors
    ///
    /// - [`RagError::ConfigError`] if the query is empty or blank.
    /// - [`RagError::SynthesisError`] if the final generation call fails.
    pub async fn answer_query(&self, query: &str) -> Result<AnswerResult> {
        if query.trim().is_empty() {
            return Err(RagError::ConfigError("query must not be empty".to_string()));
        }

        let candidates = self.expander.expand(query).await;
        info!(query, candidate_count = candidates.len(), "expanded query");

        let retrieval = self.retriever.retrieve(&candidates).await;
        if retrieval.all_failed() {
            // Proceed to synthesis with no context; the synthesizer falls
            // back to its sentinel and the model admits it does not know.
            warn!(attempted = retrieval.attempted, "every candidate search failed");
        }

        self.synthesizer.synthesize(query, &retrieval).await
    }

    /// Answer one user query with a caller-supplied deadline.
    ///
    /// When the deadline elapses, in-flight sub-calls are aborted, partial
    /// results are discarded, and [`RagError::Cancelled`] is returned.
    pub async fn answer_query_with_timeout(
        &self,
        query: &str,
        deadline: Duration,
    ) -> Result<AnswerResult> {
        match tokio::time::timeout(deadline, self.answer_query(query)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(query, ?deadline, "query cancelled by deadline");
                Err(RagError::Cancelled)
            }
        }
    }
}

/// Builder for constructing a [`QueryPipeline`].
///
/// The embedding provider, vector index, and generation model handles are
/// required; `config` defaults to [`PipelineConfig::default()`]. Building
/// is the pipeline's fail-fast precondition check: a missing handle is a
/// [`RagError::ConfigError`] raised before any remote call.
#[derive(Default)]
pub struct QueryPipelineBuilder {
    config: Option<PipelineConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_index: Option<Arc<dyn VectorIndex>>,
    generation_model: Option<Arc<dyn GenerationModel>>,
}

impl QueryPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector index handle.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.vector_index = Some(index);
        self
    }

    /// Set the generation model used for both expansion and synthesis.
    pub fn generation_model(mut self, model: Arc<dyn GenerationModel>) -> Self {
        self.generation_model = Some(model);
        self
    }

    /// Build the [`QueryPipeline`], validating that all handles are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required handle is missing.
    pub fn build(self) -> Result<QueryPipeline> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            RagError::ConfigError("embedding_provider is required".to_string())
        })?;
        let vector_index = self
            .vector_index
            .ok_or_else(|| RagError::ConfigError("vector_index is required".to_string()))?;
        let generation_model = self
            .generation_model
            .ok_or_else(|| RagError::ConfigError("generation_model is required".to_string()))?;

        Ok(QueryPipeline {
            expander: QueryExpander::new(generation_model.clone(), config.max_query_chars),
            retriever: Retriever::new(
                embedding_provider,
                vector_index,
                config.top_k_per_query,
                config.max_concurrency,
            ),
            synthesizer: AnswerSynthesizer::new(generation_model),
            config,
        })
    }
}
