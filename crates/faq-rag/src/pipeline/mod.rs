//! Query pipeline: retrieval, validation, then generation or refusal

pub mod generation;
pub mod orchestrator;
pub mod retrieval;
pub mod state;
pub mod validation;

pub use generation::{Generator, REFUSAL};
pub use orchestrator::Pipeline;
pub use retrieval::Retriever;
pub use state::{PipelineOutcome, PipelineState, RetrievedChunk, Stage, Verdict};
pub use validation::Validator;
