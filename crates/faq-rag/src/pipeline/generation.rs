//! Generation stage: grounded completion over validated chunks

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::generation::{PromptBuilder, GROUNDING_INSTRUCTION};
use crate::providers::GenerationProvider;

use super::state::RetrievedChunk;

/// Answer returned whenever validation refuses a query
pub const REFUSAL: &str = "I don't have enough information to answer that question.";

/// Builds the context block and calls the generation provider once
pub struct Generator {
    provider: Arc<dyn GenerationProvider>,
    timeout: Duration,
}

impl Generator {
    pub fn new(provider: Arc<dyn GenerationProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Provider output verbatim, plus the distinct categories it was grounded on
    ///
    /// Failures are surfaced, never retried here.
    #[tracing::instrument(skip(self, results), fields(model = self.provider.model(), chunks = results.len()))]
    pub async fn generate(
        &self,
        query: &str,
        results: &[RetrievedChunk],
    ) -> Result<(String, BTreeSet<String>)> {
        let context = PromptBuilder::build_context(results);
        let sources = PromptBuilder::collect_sources(results);

        let answer = tokio::time::timeout(
            self.timeout,
            self.provider.complete(GROUNDING_INSTRUCTION, &context, query),
        )
        .await
        .map_err(|_| Error::generation(format!("generation timed out after {:?}", self.timeout)))?
        .map_err(|e| match e {
            Error::GenerationUnavailable(_) => e,
            other => Error::generation(other.to_string()),
        })?;

        tracing::info!("Generated answer ({} chars)", answer.len());
        Ok((answer, sources))
    }
}
