//! Answer synthesis: grounded prompt construction and the final generation call.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{error, info};

use crate::document::{AnswerResult, RetrievalResult};
use crate::error::{RagError, Result};
use crate::generation::GenerationModel;

/// Context block substituted when no usable match was retrieved. The model
/// is still invoked and instructed to say it does not know.
pub const NO_CONTEXT_SENTINEL: &str = "No relevant context found in the knowledge base.";

/// System instruction for the answering call: answer list questions
/// exhaustively, never fabricate beyond the provided context, format as
/// Markdown.
const ANSWER_SYSTEM_PROMPT: &str = "\
你是一个《金铲铲之战》（Teamfight Tactics）的高手教练和智能助手。
请根据下方的【参考资料】回答用户的问题。

回答原则：
1. **全面性**：如果用户询问列表（如“有哪些5费卡”、“推荐阵容有哪些”），请务必列出资料中提到的**所有**相关条目，不要遗漏。
2. **准确性**：如果资料里没有提到，就诚实地说不知道，不要编造羁绊或装备数据。
3. **结构化**：使用 Markdown 列表清晰展示信息，便于阅读。";

/// Builds a grounded prompt from retrieved context and produces the final
/// answer with cited sources.
pub struct AnswerSynthesizer {
    model: Arc<dyn GenerationModel>,
}

impl AnswerSynthesizer {
    /// Create a synthesizer backed by the given generation model.
    pub fn new(model: Arc<dyn GenerationModel>) -> Self {
        Self { model }
    }

    /// Synthesize an answer for `query` grounded in `retrieval`.
    ///
    /// Context is the `text` of every usable match in retriever order,
    /// separated by blank lines, or [`NO_CONTEXT_SENTINEL`] when nothing
    /// usable was retrieved. Sources are collected only from matches that
    /// contributed text.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::SynthesisError`] if the generation call fails.
    /// Unlike expansion and retrieval, this failure is fatal for the query.
    pub async fn synthesize(
        &self,
        query: &str,
        retrieval: &RetrievalResult,
    ) -> Result<AnswerResult> {
        let mut context = String::new();
        let mut sources: BTreeSet<String> = BTreeSet::new();

        for m in &retrieval.matches {
            if let Some(metadata) = &m.metadata {
                context.push_str(&metadata.text);
                context.push_str("\n\n");
                sources.insert(metadata.source_or_unknown().to_string());
            }
        }

        if context.is_empty() {
            context.push_str(NO_CONTEXT_SENTINEL);
            sources.clear();
        }

        let user_prompt = format!("【参考资料】：\n{context}\n\n用户问题：{query}");

        let answer =
            self.model.generate(ANSWER_SYSTEM_PROMPT, &user_prompt).await.map_err(|e| {
                error!(error = %e, "answer synthesis failed");
                RagError::SynthesisError(format!("generation call failed: {e}"))
            })?;

        info!(
            context_matches = retrieval.matches.len(),
            source_count = sources.len(),
            "answer synthesized"
        );

        Ok(AnswerResult { answer, sources })
    }
}
