//! Retrieval stage: embed the query, then search the index

use std::sync::Arc;
use std::time::Duration;

use faq_index::VectorIndex;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

use super::state::RetrievedChunk;

/// Embeds queries and returns the `top_k` nearest chunks
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
    top_k: usize,
    timeout: Duration,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<VectorIndex>,
        top_k: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            embedder,
            index,
            top_k,
            timeout,
        }
    }

    pub fn index(&self) -> &Arc<VectorIndex> {
        &self.index
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Ranked chunks for `query`. An empty result is not an error.
    #[tracing::instrument(skip(self), fields(provider = self.embedder.name()))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
        let embedding = tokio::time::timeout(self.timeout, self.embedder.embed(query))
            .await
            .map_err(|_| {
                Error::embedding(format!("embedding timed out after {:?}", self.timeout))
            })?
            .map_err(|e| match e {
                Error::EmbeddingUnavailable(_) => e,
                other => Error::embedding(other.to_string()),
            })?;

        let results: Vec<RetrievedChunk> = self
            .index
            .search(&embedding, self.top_k)?
            .into_iter()
            .map(RetrievedChunk::from)
            .collect();

        tracing::info!("Retrieved {} chunks", results.len());
        Ok(results)
    }
}
