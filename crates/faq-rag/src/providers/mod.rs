//! Provider abstractions for embeddings and answer generation
//!
//! The pipeline only sees these traits, so any backend (or a deterministic
//! stand-in in tests) can be injected.

pub mod embedding;
pub mod generation;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use generation::GenerationProvider;
pub use ollama::OllamaClient;
