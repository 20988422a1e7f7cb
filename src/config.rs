//! Configuration for the query pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the query pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    /// Number of matches requested from the vector index per candidate
    /// query. Deliberately large so list-style questions ("which 5-cost
    /// units exist") recall every relevant item, not just the best hit.
    /// Merged results are never trimmed back to a top-K, so raising this
    /// also raises the context size handed to the generation model.
    pub top_k_per_query: usize,
    /// Maximum number of candidate embed+search operations in flight at
    /// once, bounding pressure on embedding and index rate limits.
    pub max_concurrency: usize,
    /// Maximum query length (in characters) forwarded to query expansion.
    /// Longer input is truncated to bound downstream search fan-out.
    pub max_query_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { top_k_per_query: 1000, max_concurrency: 4, max_query_chars: 512 }
    }
}

impl PipelineConfig {
    /// Create a new builder for constructing a [`PipelineConfig`].
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    /// Set the number of matches requested per candidate query.
    pub fn top_k_per_query(mut self, top_k: usize) -> Self {
        self.config.top_k_per_query = top_k;
        self
    }

    /// Set the maximum number of concurrent candidate searches.
    pub fn max_concurrency(mut self, limit: usize) -> Self {
        self.config.max_concurrency = limit;
        self
    }

    /// Set the maximum query length (characters) passed to expansion.
    pub fn max_query_chars(mut self, chars: usize) -> Self {
        self.config.max_query_chars = chars;
        self
    }

    /// Build the [`PipelineConfig`], validating that parameters are usable.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any parameter is zero.
    pub fn build(self) -> Result<PipelineConfig> {
        if self.config.top_k_per_query == 0 {
            return Err(RagError::ConfigError(
                "top_k_per_query must be greater than zero".to_string(),
            ));
        }
        if self.config.max_concurrency == 0 {
            return Err(RagError::ConfigError(
                "max_concurrency must be greater than zero".to_string(),
            ));
        }
        if self.config.max_query_chars == 0 {
            return Err(RagError::ConfigError(
                "max_query_chars must be greater than zero".to_string(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keeps_large_per_query_cap() {
        let config = PipelineConfig::default();
        assert_eq!(config.top_k_per_query, 1000);
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.max_query_chars, 512);
    }

    #[test]
    fn builder_rejects_zero_parameters() {
        assert!(PipelineConfig::builder().top_k_per_query(0).build().is_err());
        assert!(PipelineConfig::builder().max_concurrency(0).build().is_err());
        assert!(PipelineConfig::builder().max_query_chars(0).build().is_err());
    }

    #[test]
    fn builder_applies_overrides() {
        let config = PipelineConfig::builder()
            .top_k_per_query(50)
            .max_concurrency(2)
            .max_query_chars(200)
            .build()
            .unwrap();
        assert_eq!(config.top_k_per_query, 50);
        assert_eq!(config.max_concurrency, 2);
        assert_eq!(config.max_query_chars, 200);
    }
}
