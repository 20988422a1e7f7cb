//! In-memory vector index using cosine similarity.
//!
//! [`InMemoryVectorIndex`] is a zero-dependency index backed by a `HashMap`
//! protected by a `tokio::sync::RwLock`. It is suitable for development,
//! testing, and small knowledge bases.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::document::{ChunkMetadata, Match};
use crate::error::Result;
use crate::vectorstore::VectorIndex;

/// An embedded chunk as stored by the in-memory index.
#[derive(Debug, Clone)]
struct StoredChunk {
    embedding: Vec<f32>,
    metadata: Value,
}

/// An in-memory [`VectorIndex`] using cosine similarity for search.
///
/// Population happens directly through [`insert`](InMemoryVectorIndex::insert);
/// the pipeline itself only searches.
///
/// # Example
///
/// ```rust,ignore
/// use tactics_rag::{InMemoryVectorIndex, VectorIndex};
/// use serde_json::json;
///
/// let index = InMemoryVectorIndex::new();
/// index.insert("chunk-1", vec![0.1, 0.9], json!({"text": "...", "source": "wiki"})).await;
/// let matches = index.search(&[0.1, 0.9], 10, true).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    chunks: RwLock<HashMap<String, StoredChunk>>,
}

impl InMemoryVectorIndex {
    /// Create a new empty in-memory index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a chunk by identifier.
    pub async fn insert(&self, id: impl Into<String>, embedding: Vec<f32>, metadata: Value) {
        let mut chunks = self.chunks.write().await;
        chunks.insert(id.into(), StoredChunk { embedding, metadata });
    }

    /// Number of stored chunks.
    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    /// Whether the index holds no chunks.
    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn search(
        &self,
        embedding: &[f32],
        top_k: usize,
        include_metadata: bool,
    ) -> Result<Vec<Match>> {
        let chunks = self.chunks.read().await;

        let mut scored: Vec<Match> = chunks
            .iter()
            .map(|(id, chunk)| Match {
                id: id.clone(),
                score: cosine_similarity(&chunk.embedding, embedding),
                metadata: if include_metadata {
                    ChunkMetadata::from_value(chunk.metadata.clone())
                } else {
                    None
                },
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}
