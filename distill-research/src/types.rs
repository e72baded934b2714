//! Types for the research engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Query-generation strategy producing a themed batch of search queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryIntent {
    /// Broad topic coverage
    General,
    /// Competitors, alternatives, market positioning
    Competitive,
    /// Architecture, implementation, internals
    Technical,
}

impl std::fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryIntent::General => write!(f, "general"),
            QueryIntent::Competitive => write!(f, "competitive"),
            QueryIntent::Technical => write!(f, "technical"),
        }
    }
}

/// A single planned search query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Query text sent to the search provider
    pub text: String,
    /// Intent that produced this query
    pub intent: QueryIntent,
    /// Research depth at which the query was generated
    pub depth: u8,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, intent: QueryIntent, depth: u8) -> Self {
        Self {
            text: text.into(),
            intent,
            depth,
        }
    }
}

/// A single scored search result
///
/// Created exactly once per search hit. Duplicate URLs from different queries
/// may coexist; results are never merged across queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchResult {
    /// Unique identifier
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Human-readable origin (usually the host name)
    pub source: String,
    /// Relevance in [0,1]; initialized to 0.5, set once by the scorer
    pub relevance: f64,
    /// When this result was found
    pub date_found: DateTime<Utc>,
    /// Keywords extracted at creation (at most 5)
    pub keywords: Vec<String>,
}

/// A fixed thematic bucket that results are assigned into post-ranking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterCategory {
    pub name: String,
    pub description: String,
    /// Display priority, 1 is highest
    pub priority: u8,
    /// Results assigned to this category, in assignment order
    pub results: Vec<ResearchResult>,
    /// Mean relevance of assigned results (0.0 when empty)
    pub quality: f64,
    /// Fraction of assigned results with relevance > 0.6
    pub density: f64,
}

/// Outcome of clustering a result set into the fixed categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringResult {
    /// All categories, ordered by priority ascending, ties by quality descending
    pub categories: Vec<ClusterCategory>,
    /// Mean of category qualities weighted by result count
    pub overall_quality: f64,
    /// Detected coverage deficiencies (at most 5)
    pub coverage_gaps: Vec<String>,
    /// Number of results assigned to some category
    pub total_categorized: usize,
    /// Number of results left unassigned
    pub uncategorized_count: usize,
}

/// Competitive-landscape insight section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompetitiveInsights {
    pub key_players: Vec<String>,
    pub market_positioning: String,
    pub competitive_advantages: Vec<String>,
    pub competitive_threats: Vec<String>,
}

/// Technical-landscape insight section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnicalInsights {
    pub core_technologies: Vec<String>,
    pub architecture_patterns: String,
    pub implementation_challenges: Vec<String>,
    pub maturity_assessment: String,
}

/// Strategic insight section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategicInsights {
    pub opportunities: Vec<String>,
    pub risks: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub timing_considerations: String,
}

/// Structured, actionable insights synthesized from clustered results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionableInsights {
    pub competitive: CompetitiveInsights,
    pub technical: TechnicalInsights,
    pub strategic: StrategicInsights,
    /// Short narrative overview composed from the sections
    pub executive_summary: String,
    /// Trust in the synthesized insights, in [0,1]
    pub confidence: f64,
    /// Information areas the synthesis could not cover
    pub data_gaps: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Final research report
///
/// Root aggregate; constructed once and never mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub id: Uuid,
    /// Original research topic
    pub query: String,
    pub depth: u8,
    /// All generated queries, concatenated across phases in phase order
    pub generated_queries: Vec<SearchQuery>,
    /// Final ranked results
    pub results: Vec<ResearchResult>,
    pub summary: String,
    pub date_generated: DateTime<Utc>,
    pub total_results: usize,
    /// Mean of all result relevances (0.0 when no results)
    pub relevance_score: f64,
    /// Thematic clustering (present at depth >= 2)
    pub clustering: Option<ClusteringResult>,
    /// Synthesized insights (present at depth >= 3 when synthesis succeeded)
    pub insights: Option<ActionableInsights>,
}

/// Engine-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Maximum hits requested per search query
    pub max_results_per_query: usize,
    /// Search language code
    pub language: String,
    /// Sampling temperature for query generation
    pub query_temperature: f32,
    /// Sampling temperature for insight synthesis
    pub insight_temperature: f32,
    /// Sampling temperature for summary generation
    pub summary_temperature: f32,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_results_per_query: 5,
            language: "en".to_string(),
            query_temperature: 0.7,
            insight_temperature: 0.4,
            summary_temperature: 0.5,
        }
    }
}
