//! faq-rag: grounded question answering over a small FAQ knowledge base
//!
//! A query is embedded, matched against an exact vector index, checked by a
//! few admission rules and then either answered by a language model from the
//! retrieved passages or refused outright. Refusals never reach the model.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod server;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineOutcome, PipelineState, Stage, Verdict};
pub use providers::{EmbeddingProvider, GenerationProvider, OllamaClient};
pub use types::{QueryRequest, QueryResponse};

/// Re-export the index crate for convenience
pub use faq_index;
