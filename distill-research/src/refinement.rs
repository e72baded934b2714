//! Query refinement from early high-value results
//!
//! At depth >= 3 the engine feeds its best-ranked results back into the text
//! generator to propose follow-up queries. Refinement is opportunistic: a
//! failure leaves the pipeline with the initial query set.

use crate::planner::{dedup_case_insensitive, parse_generated_queries};
use crate::types::{QueryIntent, ResearchConfig, ResearchResult, SearchQuery};
use distill_core::{CancellationToken, DistillResult, GenerationOptions, TextGenerator};
use std::sync::Arc;
use tracing::{debug, info};

/// Ranked results inspected for refinement
const CANDIDATE_POOL: usize = 10;

/// Relevance bound for the candidate filter
const CANDIDATE_THRESHOLD: f64 = 0.6;

/// Fallback pool size when no candidate passes the filter
const FALLBACK_POOL: usize = 5;

const SNIPPET_CONTEXT_CHARS: usize = 200;
const REFINEMENT_MAX_TOKENS: u32 = 200;

/// Proposes follow-up queries from ranked results
pub struct RefinementEngine {
    generator: Arc<dyn TextGenerator>,
    config: ResearchConfig,
}

impl RefinementEngine {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ResearchConfig) -> Self {
        Self { generator, config }
    }

    /// Propose follow-up queries from the current ranking.
    ///
    /// Considers the top ten results with relevance above 0.6, falling back
    /// to the top five unfiltered when none qualify. The follow-up count
    /// scales with depth: 2 at depth 3, 3 at depth 4, 4 at depth >= 5.
    pub async fn propose_queries(
        &self,
        cancel: &CancellationToken,
        topic: &str,
        depth: u8,
        ranked: &[ResearchResult],
    ) -> DistillResult<Vec<SearchQuery>> {
        let candidates: Vec<&ResearchResult> = {
            let filtered: Vec<&ResearchResult> = ranked
                .iter()
                .take(CANDIDATE_POOL)
                .filter(|r| r.relevance > CANDIDATE_THRESHOLD)
                .collect();
            if filtered.is_empty() {
                ranked.iter().take(FALLBACK_POOL).collect()
            } else {
                filtered
            }
        };

        if candidates.is_empty() {
            debug!("No results available for refinement");
            return Ok(Vec::new());
        }

        let count = followup_count(depth);
        let context = context_block(&candidates);
        let prompt = format!(
            "You are refining a web research session on \"{topic}\".\n\
             The most valuable results so far:\n{context}\n\
             Propose {count} follow-up search queries that deepen coverage of \
             aspects these results surface but do not fully answer.\n\
             Return exactly one query per line with no numbering or commentary."
        );

        let options = GenerationOptions::default()
            .with_max_tokens(REFINEMENT_MAX_TOKENS)
            .with_temperature(self.config.query_temperature);

        let response = self.generator.generate_text(cancel, &prompt, &options).await?;

        let texts = dedup_case_insensitive(
            parse_generated_queries(&response)
                .into_iter()
                .take(count)
                .collect(),
        );

        info!(count = texts.len(), "Refinement proposed follow-up queries");

        Ok(texts
            .into_iter()
            .map(|text| SearchQuery::new(text, QueryIntent::General, depth))
            .collect())
    }
}

/// Follow-up query count by depth
fn followup_count(depth: u8) -> usize {
    match depth {
        3 => 2,
        4 => 3,
        _ => 4,
    }
}

/// Compact context block listing candidate results
fn context_block(candidates: &[&ResearchResult]) -> String {
    candidates
        .iter()
        .map(|r| {
            let snippet: String = r.snippet.chars().take(SNIPPET_CONTEXT_CHARS).collect();
            format!("- {} ({}): {}", r.title, r.source, snippet)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn followup_count_scales_with_depth() {
        assert_eq!(followup_count(3), 2);
        assert_eq!(followup_count(4), 3);
        assert_eq!(followup_count(5), 4);
        assert_eq!(followup_count(9), 4);
    }
}
