//! Search execution
//!
//! Wraps one provider call per query and turns raw hits into scored-later
//! [`ResearchResult`]s. Provider failures are the caller's responsibility to
//! skip; this module never aborts a batch.

use crate::planner::STOP_WORDS;
use crate::types::{ResearchResult, SearchQuery};
use chrono::Utc;
use distill_core::{CancellationToken, DistillResult, SearchOptions, SearchProvider};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const MAX_KEYWORDS: usize = 5;

/// Placeholder relevance assigned at creation, overwritten by the scorer
const NEUTRAL_RELEVANCE: f64 = 0.5;

/// Executes planned queries against the search provider
pub struct SearchExecutor {
    provider: Arc<dyn SearchProvider>,
    options: SearchOptions,
}

impl SearchExecutor {
    pub fn new(provider: Arc<dyn SearchProvider>, options: SearchOptions) -> Self {
        Self { provider, options }
    }

    /// Execute one query and materialize its hits as research results.
    ///
    /// Errors here represent a single failed query; callers skip and continue.
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        query: &SearchQuery,
    ) -> DistillResult<Vec<ResearchResult>> {
        let hits = self
            .provider
            .search(cancel, &query.text, &self.options)
            .await?;

        debug!(query = %query.text, hits = hits.len(), "Search executed");

        Ok(hits
            .into_iter()
            .map(|hit| ResearchResult {
                id: Uuid::new_v4(),
                relevance: NEUTRAL_RELEVANCE,
                date_found: Utc::now(),
                keywords: extract_keywords(&hit.title, &hit.snippet),
                title: hit.title,
                url: hit.url,
                snippet: hit.snippet,
                source: hit.source,
            })
            .collect())
    }
}

/// Extract up to five keywords from a hit's title and snippet
pub(crate) fn extract_keywords(title: &str, snippet: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut keywords = Vec::new();

    for word in title.split_whitespace().chain(snippet.split_whitespace()) {
        let cleaned: String = word
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect::<String>()
            .to_lowercase();

        if cleaned.len() > 3 && !STOP_WORDS.contains(&cleaned.as_str()) && seen.insert(cleaned.clone())
        {
            keywords.push(cleaned);
            if keywords.len() == MAX_KEYWORDS {
                break;
            }
        }
    }

    keywords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_capped_and_deduplicated() {
        let keywords = extract_keywords(
            "Tokio scheduler internals",
            "The tokio scheduler balances worker threads across cores using work stealing",
        );
        assert!(keywords.len() <= 5);
        assert_eq!(
            keywords.iter().filter(|k| k.as_str() == "tokio").count(),
            1
        );
        assert!(keywords.contains(&"scheduler".to_string()));
    }

    #[test]
    fn stop_words_and_short_tokens_are_dropped() {
        let keywords = extract_keywords("What is the API?", "It is an API");
        assert!(!keywords.contains(&"what".to_string()));
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.contains(&"api".to_string())); // 3 chars
    }
}
