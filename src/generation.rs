//! Generation model trait for single-turn text generation.

use async_trait::async_trait;

use crate::error::Result;

/// A text-generation model invoked as stateless single-turn calls.
///
/// The pipeline calls this twice per query: once for query expansion and once
/// for answer synthesis. Implementations should run at their lowest-variance
/// setting (temperature 0 or equivalent) so answers are reproducible for a
/// given context.
#[async_trait]
pub trait GenerationModel: Send + Sync {
    /// Generate a completion for a system instruction plus one user message.
    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}
