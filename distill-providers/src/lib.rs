//! Distill Providers - Concrete external-service implementations
//!
//! Implements the collaborator contracts defined in distill-core against real
//! services: Tavily for web search and siumai-backed LLMs for text
//! generation. The research engine itself never depends on this crate; it is
//! wired in by the embedding application.

pub mod generation;
pub mod search;

pub use generation::SiumaiTextGenerator;
pub use search::TavilySearchProvider;
