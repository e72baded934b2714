//! Multi-factor relevance scoring and ranking
//!
//! Pure, deterministic scoring of search results against the query that
//! produced them. Five weighted sub-scores: content relevance, title
//! relevance, source authority, recency, and content quality.

use crate::types::ResearchResult;
use chrono::Utc;
use std::cmp::Ordering;

const CONTENT_WEIGHT: f64 = 0.30;
const TITLE_WEIGHT: f64 = 0.15;
const AUTHORITY_WEIGHT: f64 = 0.20;
const RECENCY_WEIGHT: f64 = 0.15;
const QUALITY_WEIGHT: f64 = 0.20;

/// Official documentation, academic, and vendor domains
const TIER1_DOMAINS: &[&str] = &[
    "arxiv.org",
    "github.com",
    "huggingface.co",
    "openai.com",
    "anthropic.com",
    "research.google",
    "developer.mozilla.org",
    "docs.rs",
    "kubernetes.io",
    "python.org",
    "rust-lang.org",
];

/// Established technology press
const TIER2_DOMAINS: &[&str] = &[
    "techcrunch.com",
    "theverge.com",
    "wired.com",
    "arstechnica.com",
    "venturebeat.com",
    "infoq.com",
    "zdnet.com",
    "theregister.com",
];

/// Blog, engineering, and conference URL patterns
const TIER3_PATTERNS: &[&str] = &["/blog", "blog.", "/engineering", "engineering.", "/talks", "/conference", "medium.com"];

/// Social networks and forums
const TIER4_DOMAINS: &[&str] = &[
    "reddit.com",
    "twitter.com",
    "x.com",
    "facebook.com",
    "news.ycombinator.com",
    "quora.com",
];

/// Terms indicating technically substantive content
const TECHNICAL_TERMS: &[&str] = &[
    "architecture",
    "implementation",
    "algorithm",
    "performance",
    "benchmark",
    "api",
    "framework",
    "protocol",
    "scalability",
    "latency",
];

/// Terms indicating competitive/market content
const COMPETITIVE_TERMS: &[&str] = &[
    "vs",
    "versus",
    "alternative",
    "comparison",
    "competitor",
    "market",
    "pricing",
    "adoption",
];

/// Terms earning the practical-content bonus
const PRACTICAL_TERMS: &[&str] = &["github", "example", "tutorial", "guide"];

/// Pure multi-factor relevance scorer
#[derive(Debug, Default)]
pub struct RelevanceScorer;

impl RelevanceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Score a result against the words of its originating query.
    ///
    /// Deterministic for a fixed `date_found`; returns a value in [0,1].
    pub fn score(&self, result: &ResearchResult, query_words: &[String]) -> f64 {
        let title = result.title.to_lowercase();
        let snippet = result.snippet.to_lowercase();

        let content = content_relevance(&title, &snippet, query_words);
        let title_score = title_relevance(&title, query_words);
        let authority = authority_score(&result.url);
        let days_old = (Utc::now() - result.date_found).num_days();
        let recency = recency_score(days_old);
        let quality = quality_score(&title, &snippet);

        let total = content * CONTENT_WEIGHT
            + title_score * TITLE_WEIGHT
            + authority * AUTHORITY_WEIGHT
            + recency * RECENCY_WEIGHT
            + quality * QUALITY_WEIGHT;

        total.min(1.0)
    }
}

/// Fraction of query words found in title or snippet
fn content_relevance(title: &str, snippet: &str, query_words: &[String]) -> f64 {
    if query_words.is_empty() {
        return 0.0;
    }
    let matches = query_words
        .iter()
        .filter(|w| {
            let w = w.to_lowercase();
            title.contains(&w) || snippet.contains(&w)
        })
        .count();
    matches as f64 / query_words.len() as f64
}

/// Fraction of query words in the title, with a full-phrase bonus
fn title_relevance(title: &str, query_words: &[String]) -> f64 {
    if query_words.is_empty() {
        return 0.0;
    }
    let mut matches = query_words
        .iter()
        .filter(|w| title.contains(&w.to_lowercase()))
        .count();

    let phrase = query_words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    if title.contains(&phrase) {
        matches += query_words.len();
    }

    (matches as f64 / query_words.len() as f64).min(1.0)
}

/// Tiered domain-reputation lookup
pub(crate) fn authority_score(url: &str) -> f64 {
    let url_lower = url.to_lowercase();
    let host = url::Url::parse(&url_lower)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_default();

    if TIER1_DOMAINS.iter().any(|d| host_matches(&host, d)) {
        return 1.0;
    }
    if TIER2_DOMAINS.iter().any(|d| host_matches(&host, d)) {
        return 0.8;
    }
    if TIER3_PATTERNS.iter().any(|p| url_lower.contains(p)) {
        return 0.6;
    }
    if TIER4_DOMAINS.iter().any(|d| host_matches(&host, d)) {
        return 0.4;
    }
    0.5
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{}", domain))
}

/// Piecewise-linear decay by age in days
pub(crate) fn recency_score(days_old: i64) -> f64 {
    if days_old <= 0 {
        return 1.0;
    }
    let days = days_old as f64;
    if days <= 180.0 {
        1.0 - (days / 180.0) * 0.5
    } else if days <= 365.0 {
        0.5 - ((days - 180.0) / 185.0) * 0.3
    } else {
        0.2
    }
}

/// Term-list density score with a practical-content bonus
fn quality_score(title: &str, snippet: &str) -> f64 {
    let text = format!("{} {}", title, snippet);

    let technical = TECHNICAL_TERMS.iter().filter(|t| text.contains(*t)).count() as f64
        / TECHNICAL_TERMS.len() as f64;
    let competitive = COMPETITIVE_TERMS
        .iter()
        .filter(|t| text.contains(*t))
        .count() as f64
        / COMPETITIVE_TERMS.len() as f64;

    let mut score = 0.6 * technical + 0.4 * competitive;
    if PRACTICAL_TERMS.iter().any(|t| text.contains(*t)) {
        score += 0.1;
    }
    score.min(1.0)
}

/// Stable descending sort by relevance.
///
/// Equal-score results keep their pre-sort relative order.
pub fn rank_results(results: &mut [ResearchResult]) {
    results.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(Ordering::Equal)
    });
}

/// Lowercased whitespace-split words of a query
pub(crate) fn query_words(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use uuid::Uuid;

    fn result(title: &str, url: &str, snippet: &str) -> ResearchResult {
        ResearchResult {
            id: Uuid::new_v4(),
            title: title.to_string(),
            url: url.to_string(),
            snippet: snippet.to_string(),
            source: "test".to_string(),
            relevance: 0.5,
            date_found: Utc::now(),
            keywords: vec![],
        }
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let scorer = RelevanceScorer::new();
        let words = query_words("tokio scheduler architecture");

        // A result matching everything: tier-1 domain, fresh, all terms
        let strong = result(
            "tokio scheduler architecture benchmark guide",
            "https://github.com/tokio-rs/tokio",
            "tokio scheduler architecture implementation algorithm performance api framework \
             protocol scalability latency vs versus alternative comparison competitor market \
             pricing adoption tutorial example",
        );
        let score = scorer.score(&strong, &words);
        assert!(score <= 1.0, "score {} exceeds 1.0", score);
        assert!(score > 0.8);

        let weak = result("unrelated", "https://unknown.example", "nothing here");
        let score = scorer.score(&weak, &words);
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn full_phrase_in_title_boosts_title_relevance() {
        let words = query_words("tokio scheduler");
        let with_phrase = title_relevance("deep dive into the tokio scheduler", &words);
        let without_phrase = title_relevance("tokio and the async scheduler", &words);
        assert_eq!(with_phrase, 1.0);
        assert!(without_phrase < with_phrase);
    }

    #[test]
    fn authority_tiers() {
        assert_eq!(authority_score("https://arxiv.org/abs/2301.0001"), 1.0);
        assert_eq!(authority_score("https://www.github.com/tokio-rs"), 1.0);
        assert_eq!(authority_score("https://techcrunch.com/2025/article"), 0.8);
        assert_eq!(authority_score("https://acme.io/blog/post"), 0.6);
        assert_eq!(authority_score("https://reddit.com/r/rust"), 0.4);
        assert_eq!(authority_score("https://example.org/page"), 0.5);
    }

    #[test]
    fn recency_decays_piecewise() {
        assert_eq!(recency_score(0), 1.0);
        assert!((recency_score(90) - 0.75).abs() < 1e-9);
        assert!((recency_score(180) - 0.5).abs() < 1e-9);
        assert!(recency_score(270) < 0.5);
        assert!(recency_score(270) > 0.2);
        assert_eq!(recency_score(400), 0.2);
        assert_eq!(recency_score(10_000), 0.2);
    }

    #[test]
    fn ranking_is_stable_for_equal_scores() {
        let mut a = result("first", "https://a.example", "");
        let mut b = result("second", "https://b.example", "");
        let mut c = result("third", "https://c.example", "");
        a.relevance = 0.7;
        b.relevance = 0.9;
        c.relevance = 0.7;

        let mut results = vec![a, b, c];
        rank_results(&mut results);

        assert_eq!(results[0].title, "second");
        // equal scores keep pre-sort order
        assert_eq!(results[1].title, "first");
        assert_eq!(results[2].title, "third");
    }

    #[test]
    fn old_results_score_lower_than_fresh_ones() {
        let scorer = RelevanceScorer::new();
        let words = query_words("observability tooling");

        let fresh = result("observability tooling", "https://example.org", "overview");
        let mut stale = fresh.clone();
        stale.date_found = Utc::now() - Duration::days(500);

        assert!(scorer.score(&fresh, &words) > scorer.score(&stale, &words));
    }
}
