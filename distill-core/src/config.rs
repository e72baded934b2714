//! Configuration management

use crate::error::{DistillError, DistillResult, ErrorContext};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level Distill configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistillConfig {
    pub search: SearchProviderConfig,
    pub generation: GenerationConfig,
    pub research: ResearchSettings,
}

/// Settings for the search provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchProviderConfig {
    /// Provider name (currently "tavily")
    pub provider: String,
    /// API key (falls back to the provider's environment variable)
    pub api_key: Option<String>,
    /// Maximum hits requested per query
    pub max_results: usize,
    /// Search language code
    pub language: String,
}

/// Settings for the text-generation provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Provider name (openai, anthropic, ollama)
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// API key (falls back to the provider's environment variable)
    pub api_key: Option<String>,
    /// Custom endpoint (required for ollama, optional elsewhere)
    pub base_url: Option<String>,
}

/// Engine-level research settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchSettings {
    /// Default research depth when the caller does not specify one
    pub default_depth: u8,
}

impl Default for DistillConfig {
    fn default() -> Self {
        Self {
            search: SearchProviderConfig {
                provider: "tavily".to_string(),
                api_key: None,
                max_results: 5,
                language: "en".to_string(),
            },
            generation: GenerationConfig {
                provider: "openai".to_string(),
                model: "gpt-4o-mini".to_string(),
                temperature: 0.7,
                max_tokens: 1000,
                api_key: None,
                base_url: None,
            },
            research: ResearchSettings { default_depth: 2 },
        }
    }
}

impl DistillConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> DistillResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| DistillError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: DistillConfig = toml::from_str(&content).map_err(|e| DistillError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> DistillResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| DistillError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| DistillError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> DistillResult<()> {
        if self.search.max_results == 0 {
            return Err(DistillError::Config {
                message: "search.max_results must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set search.max_results to a positive value"),
            });
        }

        if self.generation.max_tokens == 0 {
            return Err(DistillError::Config {
                message: "generation.max_tokens must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set generation.max_tokens to a positive value"),
            });
        }

        if self.research.default_depth == 0 {
            return Err(DistillError::Config {
                message: "research.default_depth must be at least 1".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set research.default_depth between 1 and 5"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        DistillConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_zero_max_results() {
        let mut config = DistillConfig::default();
        config.search.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("distill.toml");

        let config = DistillConfig::default();
        config.save_to_file(&path).unwrap();

        let loaded = DistillConfig::from_file(&path).unwrap();
        assert_eq!(loaded.search.provider, config.search.provider);
        assert_eq!(loaded.generation.model, config.generation.model);
        assert_eq!(loaded.research.default_depth, config.research.default_depth);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = DistillConfig::from_file("/nonexistent/distill.toml").unwrap_err();
        assert!(matches!(err, DistillError::Config { .. }));
    }
}
