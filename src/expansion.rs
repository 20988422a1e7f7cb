//! Query expansion: turning one user question into several search strings.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::generation::GenerationModel;

/// System instruction for the expansion call. The model is asked to emit one
/// keyword/phrase per line with no extra commentary; anything else is
/// tolerated by the line-splitting below.
const EXPANSION_SYSTEM_PROMPT: &str = "\
你是一个《金铲铲之战》（Teamfight Tactics）的搜索优化助手。
用户的输入可能包含游戏术语、海克斯强化、英雄或装备。
请分析用户的输入，提取出需要搜索的核心关键词。

策略：
1. 如果涉及比较（如“A还是B”），请分别提取 A 和 B。
2. 识别专有名词，如“升级咯”、“潘朵拉的装备”等海克斯名称。
3. 如果用户询问某一类别的列表（如“5费卡有哪些”），请生成该类别的多种同义词查询（如“5费英雄”、“5费弈子”、“橙卡”），以增加召回率。
4. 请直接输出关键词列表，每行一个。不要包含其他文字。";

/// Expands a user query into a set of candidate search strings.
///
/// Expansion is best-effort: a failed or useless generation call never fails
/// the pipeline. The original query is always part of the returned set, so
/// retrieval degrades to a single-query search when the model is unavailable.
pub struct QueryExpander {
    model: Arc<dyn GenerationModel>,
    max_query_chars: usize,
}

impl QueryExpander {
    /// Create an expander backed by the given generation model.
    ///
    /// Queries longer than `max_query_chars` are truncated (on a char
    /// boundary) before being sent to the model.
    pub fn new(model: Arc<dyn GenerationModel>, max_query_chars: usize) -> Self {
        Self { model, max_query_chars }
    }

    /// Produce the candidate query set for one user query.
    ///
    /// Each non-empty trimmed line of the model response becomes a
    /// candidate; near-duplicate phrasings are tolerated here and resolved
    /// by match-level dedup in the retriever. The original query is appended
    /// when the model did not already emit it verbatim.
    pub async fn expand(&self, query: &str) -> Vec<String> {
        let capped: String = query.chars().take(self.max_query_chars).collect();

        let mut candidates = match self.model.generate(EXPANSION_SYSTEM_PROMPT, &capped).await {
            Ok(response) => {
                let parsed: Vec<String> = response
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect();
                debug!(count = parsed.len(), "query expansion produced candidates");
                parsed
            }
            Err(e) => {
                warn!(error = %e, "query expansion failed, falling back to original query");
                Vec::new()
            }
        };

        if !candidates.iter().any(|c| c == query) {
            candidates.push(query.to_string());
        }

        candidates
    }
}
