//! Application state for the query server

use parking_lot::RwLock;
use std::sync::Arc;

use faq_index::VectorIndex;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::pipeline::Pipeline;
use crate::providers::OllamaClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Wired pipeline around the loaded index
    pipeline: Pipeline,
    /// Ready state
    ready: RwLock<bool>,
}

impl AppState {
    /// Wrap an already-built pipeline; not ready until the listener is bound
    pub fn new(config: RagConfig, pipeline: Pipeline) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pipeline,
                ready: RwLock::new(false),
            }),
        }
    }

    /// Load the persisted index and connect the Ollama providers
    pub fn from_config(config: RagConfig) -> Result<Self> {
        tracing::info!("Initializing application state...");

        let index = VectorIndex::load(&config.index.dir)?;
        let expected = config.embeddings.dimensions;
        if expected != 0 && expected != index.dimensions() {
            return Err(Error::config(format!(
                "index at {} has {} dimensions, config expects {}",
                config.index.dir.display(),
                index.dimensions(),
                expected
            )));
        }

        let client = Arc::new(OllamaClient::new(&config.llm)?);
        tracing::info!(
            "Ollama client initialized ({} for embeddings, {} for answers)",
            config.llm.embed_model,
            config.llm.generate_model
        );

        let pipeline = Pipeline::from_config(&config, Arc::new(index), client.clone(), client);
        Ok(Self::new(config, pipeline))
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get the query pipeline
    pub fn pipeline(&self) -> &Pipeline {
        &self.inner.pipeline
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Set ready state
    pub fn set_ready(&self, ready: bool) {
        *self.inner.ready.write() = ready;
    }
}
