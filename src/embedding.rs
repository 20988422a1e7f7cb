//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// The role a text plays in similarity search.
///
/// Indexes are populated with passage-mode vectors; queries against them must
/// use query-mode vectors. The two are not interchangeable even when produced
/// by the same model, so every [`embed`](EmbeddingProvider::embed) call states
/// its mode explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    /// Embedding a search query.
    Query,
    /// Embedding stored content at indexing time.
    Passage,
}

impl EmbeddingMode {
    /// The wire value used by inference APIs (`"query"` / `"passage"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            EmbeddingMode::Query => "query",
            EmbeddingMode::Passage => "passage",
        }
    }
}

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface and are shared across concurrent queries as stateless
/// `Arc<dyn EmbeddingProvider>` handles.
///
/// # Example
///
/// ```rust,ignore
/// use tactics_rag::{EmbeddingMode, EmbeddingProvider};
///
/// let vector = provider.embed("5费卡有哪些", EmbeddingMode::Query).await?;
/// assert_eq!(vector.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str, mode: EmbeddingMode) -> Result<Vec<f32>>;

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
