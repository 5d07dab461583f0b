//! Deterministic provider stand-ins shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use faq_rag::faq_index::{Chunk, VectorIndex};
use faq_rag::{EmbeddingProvider, Error, GenerationProvider, Pipeline, RagConfig, Result};

/// Looks texts up in a table, falling back to a default vector
pub struct TableEmbedder {
    table: HashMap<String, Vec<f32>>,
    fallback: Vec<f32>,
    calls: AtomicUsize,
}

impl TableEmbedder {
    pub fn new(fallback: Vec<f32>) -> Self {
        Self {
            table: HashMap::new(),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with(mut self, text: &str, embedding: Vec<f32>) -> Self {
        self.table.insert(text.to_string(), embedding);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .table
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone()))
    }

    fn name(&self) -> &str {
        "table"
    }
}

/// Always fails, like an embedding service that is down
pub struct DownEmbedder;

#[async_trait]
impl EmbeddingProvider for DownEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(Error::embedding("connection refused"))
    }

    fn name(&self) -> &str {
        "down"
    }
}

/// Returns a fixed answer and records the context it was given
#[derive(Default)]
pub struct StubGenerator {
    answer: String,
    calls: AtomicUsize,
    last_context: parking_lot::Mutex<Option<String>>,
}

impl StubGenerator {
    pub fn answering(answer: &str) -> Self {
        Self {
            answer: answer.to_string(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_context(&self) -> Option<String> {
        self.last_context.lock().clone()
    }
}

#[async_trait]
impl GenerationProvider for StubGenerator {
    async fn complete(&self, _instruction: &str, context: &str, _query: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock() = Some(context.to_string());
        Ok(self.answer.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }
}

/// Three chunks: two Eligibility rows near the origin, one Cost row far away
pub fn scenario_index() -> VectorIndex {
    VectorIndex::build(
        vec![
            Chunk::new(
                "faq_001_chunk_1",
                "Eligibility",
                "cms.gov",
                "Question: who is eligible?\nAnswer: People 65 or older.",
            ),
            Chunk::new(
                "faq_002_chunk_1",
                "Eligibility",
                "cms.gov",
                "Question: can i enroll early?\nAnswer: Yes, with a disability.",
            ),
            Chunk::new(
                "faq_003_chunk_1",
                "Cost",
                "cms.gov",
                "Question: what does part b cost?\nAnswer: It varies by income.",
            ),
        ],
        vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![10.0, 10.0]],
    )
    .unwrap()
}

pub fn scenario_pipeline(
    config: &RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
) -> Pipeline {
    Pipeline::from_config(config, Arc::new(scenario_index()), embedder, generator)
}
