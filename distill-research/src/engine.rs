//! Research engine: orchestration and report assembly
//!
//! Drives the full pipeline for one research invocation: query planning,
//! sequential search execution, scoring and ranking, refinement, clustering,
//! coverage analysis, insight synthesis, and summary generation. Stages run
//! strictly in order; later stages depend on fully-ranked results.

use crate::clustering::ResultClusterer;
use crate::coverage::CoverageAnalyzer;
use crate::executor::SearchExecutor;
use crate::insights::InsightSynthesizer;
use crate::planner::QueryPlanner;
use crate::refinement::RefinementEngine;
use crate::scoring::{query_words, rank_results, RelevanceScorer};
use crate::types::{
    ActionableInsights, ClusteringResult, ResearchConfig, ResearchReport, ResearchResult,
    SearchQuery,
};
use chrono::Utc;
use distill_core::{
    CancellationToken, DistillError, DistillResult, ErrorContext, GenerationOptions,
    SearchOptions, SearchProvider, TextGenerator,
};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

const SUMMARY_MAX_TOKENS: u32 = 500;

/// Results listed in the summary fallback context
const SUMMARY_TOP_RESULTS: usize = 5;

/// Orchestrates one research invocation end to end
pub struct ResearchEngine {
    planner: QueryPlanner,
    executor: SearchExecutor,
    scorer: RelevanceScorer,
    refiner: RefinementEngine,
    clusterer: ResultClusterer,
    coverage: CoverageAnalyzer,
    synthesizer: InsightSynthesizer,
    generator: Arc<dyn TextGenerator>,
    config: ResearchConfig,
}

impl ResearchEngine {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        generator: Arc<dyn TextGenerator>,
        config: ResearchConfig,
    ) -> Self {
        let search_options = SearchOptions {
            max_results: config.max_results_per_query,
            language: config.language.clone(),
        };

        Self {
            planner: QueryPlanner::new(generator.clone(), config.clone()),
            executor: SearchExecutor::new(search, search_options),
            scorer: RelevanceScorer::new(),
            refiner: RefinementEngine::new(generator.clone(), config.clone()),
            clusterer: ResultClusterer::new(),
            coverage: CoverageAnalyzer::new(),
            synthesizer: InsightSynthesizer::new(generator.clone(), config.clone()),
            generator,
            config,
        }
    }

    /// Run the full research pipeline for a topic.
    ///
    /// Depth gates the stages: 1 searches and ranks; 2 adds clustering and
    /// coverage analysis; 3 and above add refinement and insight synthesis.
    /// Returns a fully populated report, or the error of the first fatal
    /// stage (general query planning or summary generation).
    pub async fn perform_research(
        &self,
        cancel: &CancellationToken,
        topic: &str,
        depth: u8,
    ) -> DistillResult<ResearchReport> {
        info!(topic, depth, "Starting research");

        let mut queries = self.planner.generate_queries(cancel, topic, depth).await?;
        let mut results = self.run_queries(cancel, &queries).await;
        rank_results(&mut results);

        if depth >= 3 {
            match self
                .refiner
                .propose_queries(cancel, topic, depth, &results)
                .await
            {
                Ok(followups) if !followups.is_empty() => {
                    let refined = self.run_queries(cancel, &followups).await;
                    queries.extend(followups);
                    results.extend(refined);
                    rank_results(&mut results);
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Refinement failed, continuing without it"),
            }
        }

        let clustering = if depth >= 2 {
            let mut clustering = self.clusterer.cluster(&results);
            clustering.coverage_gaps = self.coverage.analyze(&clustering);
            Some(clustering)
        } else {
            None
        };

        let insights = if depth >= 3 {
            match &clustering {
                Some(clustering) => {
                    match self.synthesizer.synthesize(cancel, topic, clustering).await {
                        Ok(insights) => Some(insights),
                        Err(e) => {
                            warn!(error = %e, "Insight synthesis failed, continuing without insights");
                            None
                        }
                    }
                }
                None => None,
            }
        } else {
            None
        };

        let summary = self
            .generate_summary(cancel, topic, &results, clustering.as_ref(), insights.as_ref())
            .await?;

        let relevance_score = mean_relevance(&results);
        let total_results = results.len();

        info!(
            topic,
            total_results, relevance_score, "Research completed"
        );

        Ok(ResearchReport {
            id: Uuid::new_v4(),
            query: topic.to_string(),
            depth,
            generated_queries: queries,
            results,
            summary,
            date_generated: Utc::now(),
            total_results,
            relevance_score,
            clustering,
            insights,
        })
    }

    /// Execute queries one at a time, scoring hits against their originating
    /// query. A failed query is logged and skipped; the batch never aborts.
    async fn run_queries(
        &self,
        cancel: &CancellationToken,
        queries: &[SearchQuery],
    ) -> Vec<ResearchResult> {
        let mut pool = Vec::new();

        for query in queries {
            match self.executor.execute(cancel, query).await {
                Ok(mut hits) => {
                    let words = query_words(&query.text);
                    for hit in &mut hits {
                        hit.relevance = self.scorer.score(hit, &words);
                    }
                    pool.extend(hits);
                }
                Err(e) => {
                    warn!(query = %query.text, error = %e, "Search failed, skipping query")
                }
            }
        }

        pool
    }

    /// Generate the report summary with one text-generation call.
    ///
    /// Failure here is fatal to the whole research call.
    async fn generate_summary(
        &self,
        cancel: &CancellationToken,
        topic: &str,
        results: &[ResearchResult],
        clustering: Option<&ClusteringResult>,
        insights: Option<&ActionableInsights>,
    ) -> DistillResult<String> {
        let context = summary_context(results, clustering, insights);
        let prompt = format!(
            "Write a concise research summary (3-5 sentences) about \"{topic}\" \
             based on the material below. Focus on what was learned, not on the \
             research process.\n\n{context}"
        );

        let options = GenerationOptions::default()
            .with_max_tokens(SUMMARY_MAX_TOKENS)
            .with_temperature(self.config.summary_temperature);

        self.generator
            .generate_text(cancel, &prompt, &options)
            .await
            .map_err(|e| DistillError::SummaryGeneration {
                message: format!("Summary generation failed: {}", e),
                context: ErrorContext::new("engine").with_operation("generate_summary"),
            })
    }
}

/// Mean relevance across all results, 0.0 when empty
fn mean_relevance(results: &[ResearchResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| r.relevance).sum::<f64>() / results.len() as f64
}

/// Build the summary context from the richest material available
fn summary_context(
    results: &[ResearchResult],
    clustering: Option<&ClusteringResult>,
    insights: Option<&ActionableInsights>,
) -> String {
    let mut sections = Vec::new();

    if let Some(clustering) = clustering {
        let themes: Vec<String> = clustering
            .categories
            .iter()
            .filter(|c| !c.results.is_empty())
            .map(|c| format!("{} ({} results, quality {:.2})", c.name, c.results.len(), c.quality))
            .collect();
        if !themes.is_empty() {
            sections.push(format!("Thematic coverage:\n{}", themes.join("\n")));
        }
        if !clustering.coverage_gaps.is_empty() {
            sections.push(format!(
                "Coverage gaps:\n{}",
                clustering.coverage_gaps.join("\n")
            ));
        }
    }

    if let Some(insights) = insights {
        sections.push(format!("Synthesized overview:\n{}", insights.executive_summary));
    }

    if sections.is_empty() {
        let top: Vec<String> = results
            .iter()
            .take(SUMMARY_TOP_RESULTS)
            .map(|r| {
                let snippet: String = r.snippet.chars().take(200).collect();
                format!("- {}: {}", r.title, snippet)
            })
            .collect();
        sections.push(if top.is_empty() {
            "No search results were found.".to_string()
        } else {
            format!("Top results:\n{}", top.join("\n"))
        });
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(title: &str, relevance: f64) -> ResearchResult {
        ResearchResult {
            id: Uuid::new_v4(),
            title: title.to_string(),
            url: "https://example.org".to_string(),
            snippet: String::new(),
            source: "test".to_string(),
            relevance,
            date_found: Utc::now(),
            keywords: vec![],
        }
    }

    #[test]
    fn mean_relevance_of_empty_pool_is_zero() {
        assert_eq!(mean_relevance(&[]), 0.0);
    }

    #[test]
    fn mean_relevance_averages_scores() {
        let results = vec![result("a", 0.2), result("b", 0.8)];
        assert!((mean_relevance(&results) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn summary_context_falls_back_to_top_results() {
        let results = vec![result("first", 0.9)];
        let context = summary_context(&results, None, None);
        assert!(context.starts_with("Top results:"));
        assert!(context.contains("first"));
    }
}
