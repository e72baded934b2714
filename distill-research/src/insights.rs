//! Insight synthesis from clustered results
//!
//! Turns a clustering outcome into structured competitive, technical, and
//! strategic insight sections, each produced by one text-generation call.
//! Section generation is all-or-nothing; parsing of the generated prose is
//! best-effort with generic fallbacks.

use crate::types::{
    ActionableInsights, ClusteringResult, CompetitiveInsights, ResearchConfig, ResearchResult,
    StrategicInsights, TechnicalInsights,
};
use chrono::Utc;
use distill_core::{
    CancellationToken, DistillError, DistillResult, ErrorContext, GenerationOptions, TextGenerator,
};
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};

/// Representative results included per section context
const REPRESENTATIVE_RESULTS: usize = 8;

const INSIGHT_MAX_TOKENS: u32 = 600;

/// Generic value used when a labeled section cannot be located in a response
const PARSE_FALLBACK: &str = "No specific information identified";

/// Synthesizes structured insights from clustered results
pub struct InsightSynthesizer {
    generator: Arc<dyn TextGenerator>,
    config: ResearchConfig,
}

impl InsightSynthesizer {
    pub fn new(generator: Arc<dyn TextGenerator>, config: ResearchConfig) -> Self {
        Self { generator, config }
    }

    /// Synthesize insights for a topic.
    ///
    /// An empty clustering yields a placeholder with confidence 0.0 and no
    /// error. Any section generation failure is propagated; insights are
    /// all-or-nothing.
    pub async fn synthesize(
        &self,
        cancel: &CancellationToken,
        topic: &str,
        clustering: &ClusteringResult,
    ) -> DistillResult<ActionableInsights> {
        if clustering.categories.is_empty() || clustering.total_categorized == 0 {
            debug!("No categorized results, returning placeholder insights");
            return Ok(placeholder_insights(topic));
        }

        info!(
            topic,
            categorized = clustering.total_categorized,
            "Synthesizing insights"
        );

        let competitive_context =
            section_context(clustering, &["Competitive Analysis", "Recent Developments"]);
        let competitive = self
            .generate_section(cancel, &competitive_prompt(topic, &competitive_context))
            .await
            .map(|response| parse_competitive(&response))?;

        let technical_context = section_context(clustering, &["Technical Details", "Limitations"]);
        let technical = self
            .generate_section(cancel, &technical_prompt(topic, &technical_context))
            .await
            .map(|response| parse_technical(&response))?;

        let strategic_context =
            section_context(clustering, &["Overview", "Use Cases", "Recent Developments"]);
        let strategic = self
            .generate_section(cancel, &strategic_prompt(topic, &strategic_context))
            .await
            .map(|response| parse_strategic(&response))?;

        let confidence = compute_confidence(clustering);
        let executive_summary =
            compose_executive_summary(topic, clustering, &competitive, &technical, &strategic);

        Ok(ActionableInsights {
            competitive,
            technical,
            strategic,
            executive_summary,
            confidence,
            data_gaps: clustering.coverage_gaps.clone(),
            generated_at: Utc::now(),
        })
    }

    async fn generate_section(
        &self,
        cancel: &CancellationToken,
        prompt: &str,
    ) -> DistillResult<String> {
        let options = GenerationOptions::default()
            .with_max_tokens(INSIGHT_MAX_TOKENS)
            .with_temperature(self.config.insight_temperature);

        self.generator
            .generate_text(cancel, prompt, &options)
            .await
            .map_err(|e| DistillError::InsightGeneration {
                message: format!("Insight section generation failed: {}", e),
                context: ErrorContext::new("insights").with_operation("generate_section"),
            })
    }
}

/// Placeholder returned for empty clustering input
fn placeholder_insights(topic: &str) -> ActionableInsights {
    ActionableInsights {
        competitive: CompetitiveInsights::default(),
        technical: TechnicalInsights::default(),
        strategic: StrategicInsights::default(),
        executive_summary: format!(
            "Insufficient research coverage to synthesize insights for '{}'.",
            topic
        ),
        confidence: 0.0,
        data_gaps: vec!["No categorized results available for insight synthesis".to_string()],
        generated_at: Utc::now(),
    }
}

/// Confidence derived from cluster quality and coverage.
///
/// Always clamped into [0,1].
pub(crate) fn compute_confidence(clustering: &ClusteringResult) -> f64 {
    let mut confidence =
        clustering.overall_quality - 0.1 * clustering.coverage_gaps.len() as f64;
    if clustering.total_categorized >= 10 {
        confidence += 0.1;
    }
    if clustering.total_categorized >= 20 {
        confidence += 0.1;
    }
    if clustering.uncategorized_count as f64 > clustering.total_categorized as f64 / 2.0 {
        confidence -= 0.15;
    }
    confidence.clamp(0.0, 1.0)
}

/// Representative results from the named categories, falling back to all
/// categorized results when those categories are empty
fn section_context(clustering: &ClusteringResult, category_names: &[&str]) -> String {
    let mut picked: Vec<&ResearchResult> = clustering
        .categories
        .iter()
        .filter(|c| category_names.contains(&c.name.as_str()))
        .flat_map(|c| c.results.iter())
        .take(REPRESENTATIVE_RESULTS)
        .collect();

    if picked.is_empty() {
        picked = clustering
            .categories
            .iter()
            .flat_map(|c| c.results.iter())
            .take(REPRESENTATIVE_RESULTS)
            .collect();
    }

    picked
        .iter()
        .map(|r| {
            let snippet: String = r.snippet.chars().take(200).collect();
            format!("- {} ({}): {}", r.title, r.source, snippet)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn competitive_prompt(topic: &str, context: &str) -> String {
    format!(
        "Analyze the research results below about \"{topic}\" and produce a \
         competitive assessment.\n\nResults:\n{context}\n\n\
         Respond using exactly these labeled sections:\n\
         Key players: one name per line as a dashed list\n\
         Market positioning: one or two sentences\n\
         Competitive advantages: dashed list\n\
         Competitive threats: dashed list"
    )
}

fn technical_prompt(topic: &str, context: &str) -> String {
    format!(
        "Analyze the research results below about \"{topic}\" and produce a \
         technical assessment.\n\nResults:\n{context}\n\n\
         Respond using exactly these labeled sections:\n\
         Core technologies: dashed list\n\
         Architecture patterns: one or two sentences\n\
         Implementation challenges: dashed list\n\
         Maturity assessment: one or two sentences"
    )
}

fn strategic_prompt(topic: &str, context: &str) -> String {
    format!(
        "Analyze the research results below about \"{topic}\" and produce a \
         strategic assessment.\n\nResults:\n{context}\n\n\
         Respond using exactly these labeled sections:\n\
         Opportunities: dashed list\n\
         Risks: dashed list\n\
         Recommended actions: dashed list\n\
         Timing considerations: one or two sentences"
    )
}

fn parse_competitive(response: &str) -> CompetitiveInsights {
    CompetitiveInsights {
        key_players: extract_list(response, "key players"),
        market_positioning: extract_text(response, "market positioning"),
        competitive_advantages: extract_list(response, "competitive advantages"),
        competitive_threats: extract_list(response, "competitive threats"),
    }
}

fn parse_technical(response: &str) -> TechnicalInsights {
    TechnicalInsights {
        core_technologies: extract_list(response, "core technologies"),
        architecture_patterns: extract_text(response, "architecture patterns"),
        implementation_challenges: extract_list(response, "implementation challenges"),
        maturity_assessment: extract_text(response, "maturity assessment"),
    }
}

fn parse_strategic(response: &str) -> StrategicInsights {
    StrategicInsights {
        opportunities: extract_list(response, "opportunities"),
        risks: extract_list(response, "risks"),
        recommended_actions: extract_list(response, "recommended actions"),
        timing_considerations: extract_text(response, "timing considerations"),
    }
}

/// Find the line carrying the anchor label, returning its index and any
/// inline remainder after the separator
fn find_anchor(response: &str, anchor: &str) -> Option<(usize, String)> {
    let pattern = Regex::new(&format!(r"(?i)^[\s#*\-]*{}\s*[:\-]\s*(.*)$", regex::escape(anchor)))
        .unwrap();

    for (index, line) in response.lines().enumerate() {
        if let Some(captures) = pattern.captures(line) {
            let remainder = captures
                .get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default();
            return Some((index, remainder));
        }
    }
    None
}

/// Extract a bulleted list anchored at a labeled section.
///
/// Best-effort: a response without the anchor yields a single generic
/// fallback entry.
fn extract_list(response: &str, anchor: &str) -> Vec<String> {
    let Some((anchor_index, remainder)) = find_anchor(response, anchor) else {
        return vec![PARSE_FALLBACK.to_string()];
    };

    let bullet = Regex::new(r"^\s*(?:[-*•]|\d+[.)])\s*").unwrap();
    let mut items = Vec::new();

    if !remainder.is_empty() {
        items.push(remainder);
    }

    for line in response.lines().skip(anchor_index + 1) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if bullet.is_match(line) {
            let item = bullet.replace(line, "").trim().to_string();
            if !item.is_empty() {
                items.push(item);
            }
        } else {
            break;
        }
    }

    if items.is_empty() {
        vec![PARSE_FALLBACK.to_string()]
    } else {
        items
    }
}

/// Extract a free-text value anchored at a labeled section
fn extract_text(response: &str, anchor: &str) -> String {
    let Some((anchor_index, remainder)) = find_anchor(response, anchor) else {
        return PARSE_FALLBACK.to_string();
    };

    if !remainder.is_empty() {
        return remainder;
    }

    response
        .lines()
        .skip(anchor_index + 1)
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches(['-', '*', ' ']).to_string())
        .unwrap_or_else(|| PARSE_FALLBACK.to_string())
}

/// Short narrative overview composed from the parsed sections
fn compose_executive_summary(
    topic: &str,
    clustering: &ClusteringResult,
    competitive: &CompetitiveInsights,
    technical: &TechnicalInsights,
    strategic: &StrategicInsights,
) -> String {
    let covered_themes = clustering
        .categories
        .iter()
        .filter(|c| !c.results.is_empty())
        .count();

    let mut summary = format!(
        "Research into '{}' categorized {} of {} results across {} themes.",
        topic,
        clustering.total_categorized,
        clustering.total_categorized + clustering.uncategorized_count,
        covered_themes
    );

    let players = named_items(&competitive.key_players);
    if !players.is_empty() {
        summary.push_str(&format!(" Key players include {}.", players.join(", ")));
    }

    let technologies = named_items(&technical.core_technologies);
    if !technologies.is_empty() {
        summary.push_str(&format!(
            " Core technologies center on {}.",
            technologies.join(", ")
        ));
    }

    if let Some(action) = strategic
        .recommended_actions
        .iter()
        .find(|a| a.as_str() != PARSE_FALLBACK)
    {
        summary.push_str(&format!(" Recommended next step: {}.", action));
    }

    summary
}

/// Up to three concrete items, ignoring parse fallbacks
fn named_items(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .filter(|i| i.as_str() != PARSE_FALLBACK)
        .take(3)
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::ResultClusterer;

    #[test]
    fn confidence_is_clamped_to_unit_interval() {
        let mut clustering = ResultClusterer::new().cluster(&[]);

        clustering.overall_quality = 0.9;
        clustering.total_categorized = 25;
        clustering.coverage_gaps.clear();
        assert!(compute_confidence(&clustering) <= 1.0);

        clustering.overall_quality = 0.1;
        clustering.total_categorized = 2;
        clustering.uncategorized_count = 50;
        clustering.coverage_gaps = (0..5).map(|i| format!("gap {}", i)).collect();
        assert_eq!(compute_confidence(&clustering), 0.0);
    }

    #[test]
    fn confidence_rewards_volume_and_penalizes_noise() {
        let mut clustering = ResultClusterer::new().cluster(&[]);
        clustering.overall_quality = 0.5;
        clustering.coverage_gaps = vec!["gap".to_string()];

        clustering.total_categorized = 12;
        clustering.uncategorized_count = 0;
        let with_volume = compute_confidence(&clustering);
        // 0.5 - 0.1 + 0.1
        assert!((with_volume - 0.5).abs() < 1e-9);

        clustering.uncategorized_count = 10;
        let with_noise = compute_confidence(&clustering);
        assert!((with_noise - 0.35).abs() < 1e-9);
    }

    #[test]
    fn extract_list_reads_dashed_items() {
        let response = "Key players:\n- Acme Corp\n- Globex\n- Initech\n\nMarket positioning: fragmented";
        let players = extract_list(response, "key players");
        assert_eq!(players, vec!["Acme Corp", "Globex", "Initech"]);
    }

    #[test]
    fn extract_list_falls_back_when_anchor_missing() {
        let items = extract_list("completely freeform response", "key players");
        assert_eq!(items, vec![PARSE_FALLBACK.to_string()]);
    }

    #[test]
    fn extract_text_reads_inline_and_following_line() {
        let response = "Market positioning: highly concentrated\nMaturity assessment:\nproduction ready";
        assert_eq!(
            extract_text(response, "market positioning"),
            "highly concentrated"
        );
        assert_eq!(
            extract_text(response, "maturity assessment"),
            "production ready"
        );
    }

    #[tokio::test]
    async fn empty_clustering_yields_placeholder_without_error() {
        struct FailingGenerator;

        #[async_trait::async_trait]
        impl TextGenerator for FailingGenerator {
            async fn generate_text(
                &self,
                _cancel: &CancellationToken,
                _prompt: &str,
                _options: &GenerationOptions,
            ) -> DistillResult<String> {
                panic!("must not be called for empty clustering");
            }
        }

        let synthesizer = InsightSynthesizer::new(
            Arc::new(FailingGenerator),
            ResearchConfig::default(),
        );
        let clustering = ResultClusterer::new().cluster(&[]);

        let insights = synthesizer
            .synthesize(&CancellationToken::new(), "observability tooling", &clustering)
            .await
            .unwrap();

        assert_eq!(insights.confidence, 0.0);
        assert_eq!(insights.data_gaps.len(), 1);
    }
}
