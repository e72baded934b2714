//! Query planning across search intents
//!
//! Builds the initial query set for a topic. Every plan starts with a general
//! batch; deeper research adds competitive and technical batches. Long
//! generated phrases are expanded into shorter keyword variants to diversify
//! search hits.

use crate::types::{QueryIntent, ResearchConfig, SearchQuery};
use distill_core::{
    CancellationToken, DistillError, DistillResult, ErrorContext, GenerationOptions, TextGenerator,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Words stripped when building keyword variants and extracting keywords
pub(crate) const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "for", "with", "of", "to", "in", "on", "at", "by",
    "from", "is", "are", "was", "were", "be", "been", "how", "what", "when", "where", "why",
    "which", "does", "do", "can", "its", "their", "this", "that", "about",
];

const QUERY_MAX_TOKENS: u32 = 300;

/// Plans the search query set for a research topic
pub struct QueryPlanner {
    generator: Arc<dyn TextGenerator>,
    config: ResearchConfig,
}

impl QueryPlanner {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ResearchConfig) -> Self {
        Self { generator, config }
    }

    /// Generate the phase-1 query set for a topic at the given depth.
    ///
    /// The general batch is mandatory and its failure is propagated. The
    /// competitive (depth >= 2) and technical (depth >= 3) batches are
    /// opportunistic: a failure there is logged and the batch skipped.
    pub async fn generate_queries(
        &self,
        cancel: &CancellationToken,
        topic: &str,
        depth: u8,
    ) -> DistillResult<Vec<SearchQuery>> {
        info!(topic, depth, "Planning search queries");

        let mut queries = self
            .generate_batch(cancel, topic, depth, QueryIntent::General)
            .await
            .map_err(|e| DistillError::QueryGeneration {
                message: format!("General query batch failed: {}", e),
                context: ErrorContext::new("planner").with_operation("general_batch"),
            })?;

        if depth >= 2 {
            match self
                .generate_batch(cancel, topic, depth, QueryIntent::Competitive)
                .await
            {
                Ok(batch) => queries.extend(batch),
                Err(e) => warn!(error = %e, "Competitive query batch failed, skipping"),
            }
        }

        if depth >= 3 {
            match self
                .generate_batch(cancel, topic, depth, QueryIntent::Technical)
                .await
            {
                Ok(batch) => queries.extend(batch),
                Err(e) => warn!(error = %e, "Technical query batch failed, skipping"),
            }
        }

        debug!(count = queries.len(), "Planned queries");
        Ok(queries)
    }

    /// Generate one intent batch: LLM proposal, variant expansion, dedup
    async fn generate_batch(
        &self,
        cancel: &CancellationToken,
        topic: &str,
        depth: u8,
        intent: QueryIntent,
    ) -> DistillResult<Vec<SearchQuery>> {
        let count = batch_size(intent, depth);
        let prompt = batch_prompt(intent, topic, count);

        let options = GenerationOptions::default()
            .with_max_tokens(QUERY_MAX_TOKENS)
            .with_temperature(self.config.query_temperature);

        let response = self.generator.generate_text(cancel, &prompt, &options).await?;

        let mut texts = Vec::new();
        for query in parse_generated_queries(&response).into_iter().take(count) {
            let variants = expand_query(&query);
            texts.push(query);
            texts.extend(variants);
        }

        let texts = dedup_case_insensitive(texts);
        debug!(intent = %intent, count = texts.len(), "Generated query batch");

        Ok(texts
            .into_iter()
            .map(|text| SearchQuery::new(text, intent, depth))
            .collect())
    }
}

/// Number of queries requested from the generator for a batch
fn batch_size(intent: QueryIntent, depth: u8) -> usize {
    match intent {
        QueryIntent::General => match depth {
            1 => 3,
            2 => 4,
            _ => 5,
        },
        QueryIntent::Competitive => {
            if depth >= 3 {
                4
            } else {
                3
            }
        }
        QueryIntent::Technical => match depth {
            3 => 3,
            4 => 4,
            _ => 5,
        },
    }
}

/// Fixed prompt template per intent
fn batch_prompt(intent: QueryIntent, topic: &str, count: usize) -> String {
    match intent {
        QueryIntent::General => format!(
            "You are a research assistant planning web searches.\n\
             Generate {count} diverse search queries that build a broad overview \
             of the topic \"{topic}\": definitions, key concepts, current state, \
             and notable developments.\n\
             Return exactly one query per line with no numbering or commentary."
        ),
        QueryIntent::Competitive => format!(
            "You are a research assistant planning web searches.\n\
             Generate {count} search queries that map the competitive landscape \
             around \"{topic}\": competitors, alternatives, comparisons, market \
             positioning, and pricing.\n\
             Return exactly one query per line with no numbering or commentary."
        ),
        QueryIntent::Technical => format!(
            "You are a research assistant planning web searches.\n\
             Generate {count} search queries that dig into the technical side of \
             \"{topic}\": architecture, implementation details, performance \
             characteristics, and known limitations.\n\
             Return exactly one query per line with no numbering or commentary."
        ),
    }
}

/// Parse a generator response into candidate query strings
pub(crate) fn parse_generated_queries(response: &str) -> Vec<String> {
    let numbering = regex::Regex::new(r"^\s*(?:\d+[.)]\s*|[-*•]\s*)").unwrap();

    response
        .lines()
        .map(|line| {
            let stripped = numbering.replace(line, "");
            stripped.trim().trim_matches('"').trim().to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Expand a long phrase (> 3 tokens) into shorter keyword variants
pub(crate) fn expand_query(query: &str) -> Vec<String> {
    let tokens: Vec<&str> = query.split_whitespace().collect();
    if tokens.len() <= 3 {
        return Vec::new();
    }

    let mut variants = Vec::new();

    // first-3-words form
    variants.push(tokens[..3].join(" "));

    // stop-word-stripped form
    let significant: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !STOP_WORDS.contains(&t.to_lowercase().as_str()))
        .collect();
    if significant.len() > 1 && significant.len() < tokens.len() {
        variants.push(significant.join(" "));
    }

    // alternating significant-term form
    let alternating: Vec<&str> = significant.iter().copied().step_by(2).collect();
    if alternating.len() > 1 {
        variants.push(alternating.join(" "));
    }

    variants
}

/// Remove case-insensitive duplicates, preserving first-seen order
pub(crate) fn dedup_case_insensitive(texts: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    texts
        .into_iter()
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strips_numbering_and_quotes() {
        let response = "1. \"rust async runtimes\"\n- tokio internals\n\n2) async executors compared";
        let queries = parse_generated_queries(response);
        assert_eq!(
            queries,
            vec![
                "rust async runtimes",
                "tokio internals",
                "async executors compared"
            ]
        );
    }

    #[test]
    fn short_queries_are_not_expanded() {
        assert!(expand_query("rust async runtimes").is_empty());
    }

    #[test]
    fn long_queries_get_keyword_variants() {
        let variants = expand_query("how does the tokio scheduler balance worker threads");
        assert_eq!(variants[0], "how does the");
        // stop words removed
        assert!(variants
            .iter()
            .any(|v| v == "tokio scheduler balance worker threads"));
        assert!(variants.len() >= 2);
    }

    #[test]
    fn dedup_is_case_insensitive_and_order_preserving() {
        let texts = vec![
            "Rust Async".to_string(),
            "tokio".to_string(),
            "rust async".to_string(),
        ];
        assert_eq!(dedup_case_insensitive(texts), vec!["Rust Async", "tokio"]);
    }

    #[test]
    fn batch_sizes_follow_depth() {
        assert_eq!(batch_size(QueryIntent::General, 1), 3);
        assert_eq!(batch_size(QueryIntent::General, 2), 4);
        assert_eq!(batch_size(QueryIntent::General, 5), 5);
        assert_eq!(batch_size(QueryIntent::Competitive, 2), 3);
        assert_eq!(batch_size(QueryIntent::Competitive, 5), 4);
        assert_eq!(batch_size(QueryIntent::Technical, 3), 3);
        assert_eq!(batch_size(QueryIntent::Technical, 5), 5);
    }
}
