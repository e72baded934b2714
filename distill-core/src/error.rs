//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type DistillResult<T> = Result<T, DistillError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the Distill system
#[derive(Error, Debug)]
pub enum DistillError {
    #[error("Search error: {message}")]
    Search {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Query generation error: {message}")]
    QueryGeneration {
        message: String,
        context: ErrorContext,
    },

    #[error("Insight generation error: {message}")]
    InsightGeneration {
        message: String,
        context: ErrorContext,
    },

    #[error("Summary generation error: {message}")]
    SummaryGeneration {
        message: String,
        context: ErrorContext,
    },

    #[error("Text generation error: {message}")]
    Generation {
        message: String,
        provider: Option<String>,
        model: Option<String>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl DistillError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            DistillError::Search { context, .. } => Some(context),
            DistillError::QueryGeneration { context, .. } => Some(context),
            DistillError::InsightGeneration { context, .. } => Some(context),
            DistillError::SummaryGeneration { context, .. } => Some(context),
            DistillError::Generation { context, .. } => Some(context),
            DistillError::Config { context, .. } => Some(context),
            DistillError::Validation { context, .. } => Some(context),
            DistillError::Network { context, .. } => Some(context),
            DistillError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Check if error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            DistillError::Search { .. } => true,
            DistillError::Network { .. } => true,
            DistillError::Generation { .. } => true,
            DistillError::Config { .. } => false,
            DistillError::Validation { .. } => false,
            _ => false,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            DistillError::Search { .. } | DistillError::Network { .. } => {
                warn!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Provider error (may be recoverable)"
                );
            }
            _ => {
                error!(
                    error_id = ?self.context().map(|c| &c.error_id),
                    error = %self,
                    "Error occurred"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! search_error {
    ($msg:expr, $component:expr) => {
        $crate::DistillError::Search {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::DistillError::Search {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::DistillError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
}

#[macro_export]
macro_rules! generation_error {
    ($msg:expr, $component:expr) => {
        $crate::DistillError::Generation {
            message: $msg.to_string(),
            provider: None,
            model: None,
            context: $crate::ErrorContext::new($component),
        }
    };
}
