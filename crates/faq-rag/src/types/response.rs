//! Response types for RAG queries

use serde::{Deserialize, Serialize};

use crate::pipeline::{PipelineOutcome, PipelineState};

/// Coarse, non-authoritative hint about how much context backed an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

impl Confidence {
    /// "high" once the configured result count was met
    pub fn from_counts(retrieved: usize, top_k: usize) -> Self {
        if retrieved >= top_k {
            Self::High
        } else {
            Self::Medium
        }
    }
}

/// Response to a query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The question as asked
    pub question: String,
    /// Generated answer or the refusal text
    pub answer: String,
    /// Distinct source categories, sorted
    pub sources: Vec<String>,
    /// Confidence hint
    pub confidence: Confidence,
    /// How the pipeline ended; absent for shortcut answers
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub outcome: Option<PipelineOutcome>,
}

impl QueryResponse {
    /// Build the API response from a finished pipeline run
    pub fn from_state(state: PipelineState, top_k: usize) -> Self {
        let outcome = state.outcome();
        let confidence = Confidence::from_counts(state.results.len(), top_k);

        Self {
            question: state.query,
            answer: state.answer,
            sources: state.sources.into_iter().collect(),
            confidence,
            outcome,
        }
    }

    /// Fixed answer that bypasses the pipeline
    pub fn shortcut(question: impl Into<String>, answer: impl Into<String>, source: &str) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            sources: vec![source.to_string()],
            confidence: Confidence::High,
            outcome: None,
        }
    }
}
