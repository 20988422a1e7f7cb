//! Error types for the `tactics-rag` crate.

use thiserror::Error;

/// Errors that can occur in the query pipeline.
///
/// Only a subset of these is ever surfaced by
/// [`QueryPipeline::answer_query`](crate::pipeline::QueryPipeline::answer_query):
/// [`ConfigError`](RagError::ConfigError), [`SynthesisError`](RagError::SynthesisError),
/// and [`Cancelled`](RagError::Cancelled). Embedding, search, and expansion
/// failures are recovered internally and only show up in logs.
#[derive(Debug, Error)]
pub enum RagError {
    /// A configuration validation error: missing service handles, empty
    /// credentials, or invalid pipeline parameters.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector index backend.
    #[error("Vector index error ({backend}): {message}")]
    VectorIndexError {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A text-generation call failed.
    #[error("Generation error ({provider}): {message}")]
    GenerationError {
        /// The generation model that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The final answer-synthesis call failed. This is the only remote
    /// failure that aborts a query.
    #[error("Synthesis error: {0}")]
    SynthesisError(String),

    /// The caller cancelled the query (e.g. request timeout) before it
    /// completed.
    #[error("Query cancelled by caller")]
    Cancelled,
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, RagError>;
