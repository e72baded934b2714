//! Distill Core - Core data structures and contract definitions
//!
//! This crate defines the abstractions shared across the Distill system:
//! errors, configuration, logging setup, and the collaborator traits through
//! which the research engine reaches external search and text-generation
//! services.

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use traits::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
