//! Data types for search matches, retrieval results, and answers.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sentinel provenance value for matches whose metadata lacks a `source`.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Validated metadata attached to an indexed chunk.
///
/// Index backends store metadata as a schema-light key/value mapping. The
/// required keys are checked once, where a [`Match`] is constructed, via
/// [`ChunkMetadata::from_value`]; downstream code never probes raw maps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// The chunk's retrievable text content. Always non-empty.
    pub text: String,
    /// Provenance of the chunk (scrape source, document name, URL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Remaining metadata fields, carried through untouched.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, Value>,
}

impl ChunkMetadata {
    /// Validate a raw metadata value into a [`ChunkMetadata`].
    ///
    /// Returns `None` when the value is not an object or its `text` field is
    /// missing, non-string, or empty — such a match is unusable for context
    /// assembly and must be skipped, not treated as an error.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut map) = value else {
            return None;
        };

        let text = match map.remove("text") {
            Some(Value::String(s)) if !s.is_empty() => s,
            _ => return None,
        };
        let source = match map.remove("source") {
            Some(Value::String(s)) => Some(s),
            _ => None,
        };

        Some(Self { text, source, extra: map.into_iter().collect() })
    }

    /// The provenance string this chunk contributes to
    /// [`AnswerResult::sources`], falling back to [`UNKNOWN_SOURCE`].
    pub fn source_or_unknown(&self) -> &str {
        self.source.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }
}

/// A single similarity-search hit from the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// Identifier of the indexed chunk, unique across the whole index.
    /// The retriever dedups on this key.
    pub id: String,
    /// The similarity score reported by the index (higher is more relevant).
    pub score: f32,
    /// Validated metadata, or `None` when the index returned no usable
    /// metadata for this hit.
    pub metadata: Option<ChunkMetadata>,
}

impl Match {
    /// Whether this match can contribute text to the answer context.
    pub fn is_usable(&self) -> bool {
        self.metadata.is_some()
    }
}

/// The deduplicated union of matches across all candidate queries for one
/// user query, in discovery order.
///
/// Constructed fresh per query and discarded once the synthesizer has
/// consumed it.
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    /// Unique matches in discovery order: candidate iteration order first,
    /// then the index's own ranking within each candidate.
    pub matches: Vec<Match>,
    /// Number of candidate queries that were searched.
    pub attempted: usize,
    /// Number of candidate searches that completed without error.
    pub succeeded: usize,
}

impl RetrievalResult {
    /// Whether every candidate search failed.
    pub fn all_failed(&self) -> bool {
        self.attempted > 0 && self.succeeded == 0
    }
}

/// The terminal output of one query pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerResult {
    /// The raw text response from the generation model.
    pub answer: String,
    /// Deduplicated provenance values of the chunks that contributed text
    /// to the answer context.
    pub sources: BTreeSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn metadata_requires_nonempty_text() {
        assert!(ChunkMetadata::from_value(json!({"source": "wiki"})).is_none());
        assert!(ChunkMetadata::from_value(json!({"text": ""})).is_none());
        assert!(ChunkMetadata::from_value(json!({"text": 42})).is_none());
        assert!(ChunkMetadata::from_value(json!("not an object")).is_none());
    }

    #[test]
    fn metadata_extracts_required_and_extra_fields() {
        let meta = ChunkMetadata::from_value(json!({
            "text": "奥恩是5费英雄",
            "source": "champions.txt",
            "page": 3,
        }))
        .unwrap();

        assert_eq!(meta.text, "奥恩是5费英雄");
        assert_eq!(meta.source.as_deref(), Some("champions.txt"));
        assert_eq!(meta.extra.get("page"), Some(&json!(3)));
    }

    #[test]
    fn missing_source_falls_back_to_unknown() {
        let meta = ChunkMetadata::from_value(json!({"text": "some chunk"})).unwrap();
        assert_eq!(meta.source_or_unknown(), UNKNOWN_SOURCE);
    }
}
