//! Collaborator contracts for external services
//!
//! The research engine talks to the outside world through exactly two
//! abstractions: a search provider and a text generator. Both take a
//! cancellation token so a caller can abandon an in-flight research call;
//! cancellation surfaces as an ordinary provider error.

use crate::error::DistillResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// A single raw hit returned by a search provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Human-readable origin of the hit (usually the host name)
    pub source: String,
}

/// Options for a single search call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of hits to return
    pub max_results: usize,
    /// BCP-47 language code for the search
    pub language: String,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_results: 5,
            language: "en".to_string(),
        }
    }
}

/// Options for a single text-generation call
///
/// Replaces loosely-typed key/value option bags with the exact set of knobs
/// the engine uses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Maximum tokens to generate (provider default when None)
    pub max_tokens: Option<u32>,
    /// Sampling temperature (provider default when None)
    pub temperature: Option<f32>,
    /// Model override (configured default when None)
    pub model: Option<String>,
    /// Optional JSON schema constraining the response shape.
    /// Reserved: current providers do not enforce it.
    pub response_schema: Option<serde_json::Value>,
}

impl GenerationOptions {
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// External search service contract
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Execute one search query and return raw hits.
    ///
    /// Fails with a provider error on transport or parse failure; the caller
    /// treats that as a single skipped query.
    async fn search(
        &self,
        cancel: &CancellationToken,
        query: &str,
        options: &SearchOptions,
    ) -> DistillResult<Vec<SearchHit>>;
}

/// External text-generation service contract
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate free-form text for a prompt.
    async fn generate_text(
        &self,
        cancel: &CancellationToken,
        prompt: &str,
        options: &GenerationOptions,
    ) -> DistillResult<String>;
}
