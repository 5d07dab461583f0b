//! Prompt templates for grounded generation

use std::collections::BTreeSet;

use crate::pipeline::RetrievedChunk;

/// Fixed instruction sent with every completion
pub const GROUNDING_INSTRUCTION: &str = "You are a helpful Medicare healthcare assistant. \
Answer ONLY based on the provided context. \
If the answer is not in the context, say \"I don't have information about that.\" \
Be concise and accurate.";

/// Separator between chunks in the context block
const CONTEXT_SEPARATOR: &str = "\n\n";

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Concatenate chunk texts in rank order, one blank line apart
    pub fn build_context(results: &[RetrievedChunk]) -> String {
        results
            .iter()
            .map(|r| r.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    /// Deduplicated category labels of the results
    pub fn collect_sources(results: &[RetrievedChunk]) -> BTreeSet<String> {
        results.iter().map(|r| r.chunk.category.clone()).collect()
    }

    /// User turn: context block followed by the question
    pub fn build_user_prompt(context: &str, query: &str) -> String {
        format!("Context:\n{}\n\nQuestion: {}\n\nAnswer:", context, query)
    }
}
