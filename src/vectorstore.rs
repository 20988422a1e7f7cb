//! Vector index trait for similarity search over embedded chunks.

use async_trait::async_trait;

use crate::document::Match;
use crate::error::Result;

/// A similarity-search handle over an already-populated vector index.
///
/// The pipeline only reads: how the index was populated (scrapers, chunkers,
/// upsert batches) is upstream's concern. Implementations are stateless,
/// thread-safe handles shared across concurrent queries.
///
/// # Example
///
/// ```rust,ignore
/// use tactics_rag::{InMemoryVectorIndex, VectorIndex};
///
/// let matches = index.search(&query_embedding, 1000, true).await?;
/// ```
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Search for the `top_k` most similar chunks to the given embedding.
    ///
    /// Returns matches ordered by descending similarity score. When
    /// `include_metadata` is false, returned matches carry `metadata: None`.
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<Match>>;
}
