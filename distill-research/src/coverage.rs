//! Coverage gap detection
//!
//! Inspects a clustering outcome and reports missing or weak information
//! areas: empty categories, low-quality categories, and absent content-type
//! families.

use crate::types::ClusteringResult;

/// Maximum number of gap strings reported
const MAX_GAPS: usize = 5;

/// Category quality below which coverage is flagged as limited
const LOW_QUALITY_THRESHOLD: f64 = 0.5;

/// Content-type families checked across all categorized results
const CONTENT_FAMILIES: &[(&str, &[&str])] = &[
    (
        "technical",
        &["architecture", "implementation", "code", "api", "technical"],
    ),
    (
        "competitive",
        &["competitor", "alternative", "vs", "comparison", "market"],
    ),
    (
        "practical",
        &["tutorial", "example", "how to", "guide", "use case"],
    ),
];

/// Detects coverage deficiencies in a clustering outcome
#[derive(Debug, Default)]
pub struct CoverageAnalyzer;

impl CoverageAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Produce at most five gap strings: empty categories first, then
    /// low-quality categories, then missing content-type families.
    pub fn analyze(&self, clustering: &ClusteringResult) -> Vec<String> {
        let mut gaps = Vec::new();

        for category in &clustering.categories {
            if category.results.is_empty() {
                gaps.push(format!("No {} information found", category.name));
            }
        }

        for category in &clustering.categories {
            if !category.results.is_empty() && category.quality < LOW_QUALITY_THRESHOLD {
                gaps.push(format!("Limited high-quality {} content", category.name));
            }
        }

        for (family, keywords) in CONTENT_FAMILIES {
            if !self.family_present(clustering, keywords) {
                gaps.push(format!("No {} content found in results", family));
            }
        }

        gaps.truncate(MAX_GAPS);
        gaps
    }

    fn family_present(&self, clustering: &ClusteringResult, keywords: &[&str]) -> bool {
        clustering.categories.iter().any(|category| {
            category.results.iter().any(|result| {
                let text = format!(
                    "{} {}",
                    result.title.to_lowercase(),
                    result.snippet.to_lowercase()
                );
                keywords.iter().any(|kw| text.contains(kw))
            })
        })
    }
}
