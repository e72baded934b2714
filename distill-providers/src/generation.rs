//! LLM text generation through siumai
//!
//! Implements the [`TextGenerator`] contract on top of the siumai framework,
//! supporting the openai, anthropic, and ollama backends.

use distill_core::{
    CancellationToken, DistillError, DistillResult, ErrorContext, GenerationConfig,
    GenerationOptions, TextGenerator,
};
use siumai::prelude::*;
use tracing::debug;

/// Text generator backed by a siumai LLM client
pub struct SiumaiTextGenerator {
    config: GenerationConfig,
}

impl SiumaiTextGenerator {
    /// Create a generator from provider configuration
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// Merge per-call options over the configured defaults
    fn effective_config(&self, options: &GenerationOptions) -> GenerationConfig {
        let mut config = self.config.clone();
        if let Some(model) = &options.model {
            config.model = model.clone();
        }
        if let Some(temperature) = options.temperature {
            config.temperature = temperature;
        }
        if let Some(max_tokens) = options.max_tokens {
            config.max_tokens = max_tokens;
        }
        config
    }

    /// Build a siumai client for the effective configuration
    async fn build_client(config: &GenerationConfig) -> DistillResult<Box<dyn LlmClient>> {
        match config.provider.as_str() {
            "openai" => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                    .ok_or_else(|| config_error("OpenAI API key not found"))?;

                let mut builder = LlmBuilder::new()
                    .openai()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature)
                    .max_tokens(config.max_tokens);

                if let Some(base_url) = &config.base_url {
                    builder = builder.base_url(base_url);
                }

                let client = builder
                    .build()
                    .await
                    .map_err(|e| generation_failure("Failed to build OpenAI client", e, config))?;

                Ok(Box::new(client))
            }
            "anthropic" => {
                let api_key = config
                    .api_key
                    .clone()
                    .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                    .ok_or_else(|| config_error("Anthropic API key not found"))?;

                let client = LlmBuilder::new()
                    .anthropic()
                    .api_key(&api_key)
                    .model(&config.model)
                    .temperature(config.temperature)
                    .max_tokens(config.max_tokens)
                    .build()
                    .await
                    .map_err(|e| {
                        generation_failure("Failed to build Anthropic client", e, config)
                    })?;

                Ok(Box::new(client))
            }
            "ollama" => {
                let base_url = config
                    .base_url
                    .clone()
                    .unwrap_or_else(|| "http://localhost:11434".to_string());

                let client = LlmBuilder::new()
                    .ollama()
                    .model(&config.model)
                    .base_url(&base_url)
                    .temperature(config.temperature)
                    .max_tokens(config.max_tokens)
                    .build()
                    .await
                    .map_err(|e| generation_failure("Failed to build Ollama client", e, config))?;

                Ok(Box::new(client))
            }
            provider => Err(config_error(&format!(
                "Unsupported generation provider: {}",
                provider
            ))),
        }
    }

    async fn execute_generation(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> DistillResult<String> {
        let config = self.effective_config(options);
        let client = Self::build_client(&config).await?;

        let messages = vec![ChatMessage::user(prompt).build()];

        debug!(
            provider = %config.provider,
            model = %config.model,
            prompt_chars = prompt.len(),
            "Generating text"
        );

        let response = client
            .chat(messages)
            .await
            .map_err(|e| generation_failure("LLM generation failed", e, &config))?;

        if let Some(content) = response.content_text() {
            Ok(content.to_string())
        } else {
            Err(DistillError::Generation {
                message: "No text content in LLM response".to_string(),
                provider: Some(config.provider.clone()),
                model: Some(config.model.clone()),
                context: ErrorContext::new("siumai").with_operation("generate_text"),
            })
        }
    }
}

fn config_error(message: &str) -> DistillError {
    DistillError::Config {
        message: message.to_string(),
        source: None,
        context: ErrorContext::new("siumai")
            .with_operation("build_client")
            .with_suggestion("Set generation.api_key or the provider's environment variable"),
    }
}

fn generation_failure(
    message: &str,
    error: impl std::fmt::Display,
    config: &GenerationConfig,
) -> DistillError {
    DistillError::Generation {
        message: format!("{}: {}", message, error),
        provider: Some(config.provider.clone()),
        model: Some(config.model.clone()),
        context: ErrorContext::new("siumai").with_operation("generate_text"),
    }
}

#[async_trait::async_trait]
impl TextGenerator for SiumaiTextGenerator {
    async fn generate_text(
        &self,
        cancel: &CancellationToken,
        prompt: &str,
        options: &GenerationOptions,
    ) -> DistillResult<String> {
        tokio::select! {
            _ = cancel.cancelled() => Err(DistillError::Generation {
                message: "Text generation cancelled".to_string(),
                provider: Some(self.config.provider.clone()),
                model: Some(self.config.model.clone()),
                context: ErrorContext::new("siumai").with_operation("generate_text"),
            }),
            result = self.execute_generation(prompt, options) => result,
        }
    }
}
