//! Embeds chunks and assembles the vector index

use std::sync::Arc;

use faq_index::{Chunk, IndexError, VectorIndex};

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;

use super::faq::FaqRecord;

/// Texts handed to `EmbeddingProvider::embed_batch` per call
pub const DEFAULT_BATCH_SIZE: usize = 16;

/// Progress callback: (done, total)
pub type ProgressFn = Box<dyn Fn(usize, usize) + Send + Sync>;

/// Builds a `VectorIndex` from cleaned records
pub struct IndexBuilder {
    embedder: Arc<dyn EmbeddingProvider>,
    /// Expected dimension, 0 to accept whatever the provider returns
    dimensions: usize,
    batch_size: usize,
    progress: Option<ProgressFn>,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            dimensions: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            progress: None,
        }
    }

    /// Reject embeddings that are not `dimensions` long
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    /// Texts per `embed_batch` call, at least 1
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_progress(mut self, progress: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Embed every chunk in order and build the index
    #[tracing::instrument(skip_all, fields(records = records.len(), provider = self.embedder.name()))]
    pub async fn build(&self, records: &[FaqRecord]) -> Result<VectorIndex> {
        let chunks: Vec<Chunk> = records.iter().map(FaqRecord::to_chunk).collect();
        let total = chunks.len();
        let mut embeddings = Vec::with_capacity(total);

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let batch_embeddings = self.embedder.embed_batch(&texts).await?;
            if batch_embeddings.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "provider returned {} embeddings for {} texts",
                    batch_embeddings.len(),
                    batch.len()
                )));
            }

            for (chunk, embedding) in batch.iter().zip(&batch_embeddings) {
                if self.dimensions != 0 && embedding.len() != self.dimensions {
                    tracing::error!("Chunk {} embedded to the wrong dimension", chunk.id);
                    return Err(IndexError::DimensionMismatch {
                        expected: self.dimensions,
                        actual: embedding.len(),
                    }
                    .into());
                }
            }
            embeddings.extend(batch_embeddings);

            if let Some(progress) = &self.progress {
                progress(embeddings.len(), total);
            }
        }

        let index = VectorIndex::build(chunks, embeddings)?;
        tracing::info!(
            "Built index with {} chunks ({} dimensions)",
            index.len(),
            index.dimensions()
        );
        Ok(index)
    }
}
