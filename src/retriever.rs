//! Multi-query retrieval: embed each candidate, search, merge, dedup.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::document::{Match, RetrievalResult};
use crate::embedding::{EmbeddingMode, EmbeddingProvider};
use crate::error::Result;
use crate::vectorstore::VectorIndex;

/// Outcome of one candidate's embed+search, aggregated without unwinding
/// across tasks.
struct CandidateOutcome<'a> {
    candidate: &'a str,
    result: Result<Vec<Match>>,
}

/// Issues one similarity search per candidate query and merges the results
/// into a deduplicated [`RetrievalResult`].
///
/// Candidate searches are independent and run with bounded concurrency; a
/// failing candidate is logged and skipped, never aborting the retrieval.
/// Merged results are deliberately NOT re-ranked or trimmed to a global
/// top-K: trimming would let a dominant sub-topic crowd out rarer but
/// relevant items recalled by other candidates, and list-style questions
/// need every item. Full recall wins over ranking precision here.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    top_k_per_query: usize,
    max_concurrency: usize,
}

impl Retriever {
    /// Create a retriever over the given embedding provider and index.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        top_k_per_query: usize,
        max_concurrency: usize,
    ) -> Self {
        Self { embedder, index, top_k_per_query, max_concurrency }
    }

    /// Retrieve the deduplicated union of matches for all candidates.
    ///
    /// Output order is discovery order: candidate iteration order first, then
    /// the index's own ranking within each candidate. Dedup is by match
    /// identifier; the first-seen occurrence keeps its metadata, later
    /// duplicates are dropped without merging.
    pub async fn retrieve(&self, candidates: &[String]) -> RetrievalResult {
        let outcomes: Vec<CandidateOutcome<'_>> = stream::iter(candidates.iter())
            .map(|candidate| self.search_candidate(candidate))
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut result = RetrievalResult { attempted: candidates.len(), ..Default::default() };

        for outcome in outcomes {
            match outcome.result {
                Ok(matches) => {
                    result.succeeded += 1;
                    for m in matches {
                        if seen_ids.insert(m.id.clone()) {
                            result.matches.push(m);
                        }
                    }
                }
                Err(e) => {
                    warn!(candidate = outcome.candidate, error = %e, "candidate search failed");
                }
            }
        }

        debug!(
            attempted = result.attempted,
            succeeded = result.succeeded,
            unique_matches = result.matches.len(),
            "retrieval merged"
        );

        result
    }

    /// Embed one candidate in query mode and search the index.
    async fn search_candidate<'a>(&self, candidate: &'a str) -> CandidateOutcome<'a> {
        let result = async {
            let embedding = self.embedder.embed(candidate, EmbeddingMode::Query).await?;
            self.index.search(&embedding, self.top_k_per_query, true).await
        }
        .await;

        CandidateOutcome { candidate, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::document::ChunkMetadata;
    use crate::error::RagError;

    struct StubEmbedder;

    #[async_trait]
    impl EmbeddingProvider for StubEmbedder {
        async fn embed(&self, _text: &str, _mode: EmbeddingMode) -> Result<Vec<f32>> {
            Ok(vec![0.0; 4])
        }

        fn dimensions(&self) -> usize {
            4
        }
    }

    /// Returns one canned response per search call, in order.
    struct ScriptedIndex {
        responses: std::sync::Mutex<Vec<Result<Vec<Match>>>>,
    }

    #[async_trait]
    impl VectorIndex for ScriptedIndex {
        async fn search(
            &self,
            _embedding: &[f32],
            _top_k: usize,
            _include_metadata: bool,
        ) -> Result<Vec<Match>> {
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn match_with_text(id: &str, text: &str) -> Match {
        Match {
            id: id.to_string(),
            score: 0.9,
            metadata: ChunkMetadata::from_value(json!({"text": text})),
        }
    }

    fn retriever(responses: Vec<Result<Vec<Match>>>) -> Retriever {
        Retriever::new(
            Arc::new(StubEmbedder),
            Arc::new(ScriptedIndex { responses: std::sync::Mutex::new(responses) }),
            1000,
            // Serial execution so the scripted responses line up with candidates.
            1,
        )
    }

    #[tokio::test]
    async fn dedups_by_id_keeping_first_seen_metadata() {
        let retriever = retriever(vec![
            Ok(vec![match_with_text("a", "first"), match_with_text("b", "beta")]),
            Ok(vec![match_with_text("a", "second"), match_with_text("c", "gamma")]),
        ]);

        let result = retriever.retrieve(&["q1".into(), "q2".into()]).await;

        assert_eq!(result.matches.len(), 3);
        assert_eq!(result.matches[0].id, "a");
        assert_eq!(result.matches[0].metadata.as_ref().unwrap().text, "first");
        assert_eq!(result.matches[1].id, "b");
        assert_eq!(result.matches[2].id, "c");
    }

    #[tokio::test]
    async fn failed_candidate_is_skipped_not_fatal() {
        let retriever = retriever(vec![
            Err(RagError::VectorIndexError {
                backend: "mock".into(),
                message: "connection refused".into(),
            }),
            Ok(vec![match_with_text("x", "chi")]),
        ]);

        let result = retriever.retrieve(&["q1".into(), "q2".into()]).await;

        assert_eq!(result.attempted, 2);
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.matches.len(), 1);
        assert!(!result.all_failed());
    }

    #[tokio::test]
    async fn all_failures_degrade_to_empty_result() {
        let err = || {
            Err(RagError::VectorIndexError {
                backend: "mock".into(),
                message: "unreachable".into(),
            })
        };
        let retriever = retriever(vec![err(), err()]);

        let result = retriever.retrieve(&["q1".into(), "q2".into()]).await;

        assert!(result.all_failed());
        assert!(result.matches.is_empty());
    }

    #[tokio::test]
    async fn no_global_top_k_truncation_after_merge() {
        let bulk = |prefix: &str| -> Result<Vec<Match>> {
            Ok((0..500).map(|i| match_with_text(&format!("{prefix}-{i}"), "t")).collect())
        };
        let retriever = retriever(vec![bulk("a"), bulk("b"), bulk("c")]);

        let result =
            retriever.retrieve(&["q1".into(), "q2".into(), "q3".into()]).await;

        assert_eq!(result.matches.len(), 1500);
    }
}
