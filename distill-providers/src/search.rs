//! Tavily search provider
//!
//! HTTP-backed implementation of the [`SearchProvider`] contract against the
//! Tavily search API.

use distill_core::{
    CancellationToken, DistillError, DistillResult, ErrorContext, SearchHit, SearchOptions,
    SearchProvider,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

const TAVILY_ENDPOINT: &str = "https://api.tavily.com/search";

#[derive(Debug, Serialize)]
struct TavilySearchRequest {
    query: String,
    max_results: usize,
    search_depth: String,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    title: String,
    url: String,
    content: String,
}

/// Search provider backed by the Tavily API
pub struct TavilySearchProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl TavilySearchProvider {
    /// Create a provider with an explicit API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            endpoint: TAVILY_ENDPOINT.to_string(),
        }
    }

    /// Create a provider reading the key from `TAVILY_API_KEY`
    pub fn from_env() -> DistillResult<Self> {
        let api_key = std::env::var("TAVILY_API_KEY").map_err(|_| DistillError::Config {
            message: "TAVILY_API_KEY not set".to_string(),
            source: None,
            context: ErrorContext::new("tavily")
                .with_operation("from_env")
                .with_suggestion("Export TAVILY_API_KEY or set search.api_key in the config"),
        })?;
        Ok(Self::new(api_key))
    }

    /// Override the API endpoint (used for self-hosted gateways and tests)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn execute_request(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> DistillResult<Vec<SearchHit>> {
        let request = TavilySearchRequest {
            query: query.to_string(),
            max_results: options.max_results,
            search_depth: "basic".to_string(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| DistillError::Search {
                message: format!("Search request failed: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("tavily").with_operation("send_request"),
            })?;

        let search_response: TavilySearchResponse =
            response.json().await.map_err(|e| DistillError::Search {
                message: format!("Failed to parse search response: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("tavily").with_operation("parse_response"),
            })?;

        debug!(
            query = query,
            hits = search_response.results.len(),
            "Tavily search completed"
        );

        Ok(search_response
            .results
            .into_iter()
            .map(|r| {
                let source = host_of(&r.url);
                SearchHit {
                    title: r.title,
                    url: r.url,
                    snippet: r.content,
                    source,
                }
            })
            .collect())
    }
}

/// Extract the host portion of a URL for the hit's source label
fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

#[async_trait::async_trait]
impl SearchProvider for TavilySearchProvider {
    async fn search(
        &self,
        cancel: &CancellationToken,
        query: &str,
        options: &SearchOptions,
    ) -> DistillResult<Vec<SearchHit>> {
        tokio::select! {
            _ = cancel.cancelled() => Err(DistillError::Search {
                message: format!("Search cancelled: {}", query),
                source: None,
                context: ErrorContext::new("tavily").with_operation("search"),
            }),
            result = self.execute_request(query, options) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_of_extracts_domain() {
        assert_eq!(host_of("https://arxiv.org/abs/1234.5678"), "arxiv.org");
        assert_eq!(host_of("not a url"), "unknown");
    }

    #[tokio::test]
    async fn cancelled_token_fails_fast() {
        let provider = TavilySearchProvider::new("test-key");
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = provider
            .search(&cancel, "rust async runtimes", &SearchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DistillError::Search { .. }));
    }
}
