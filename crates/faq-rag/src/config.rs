//! Configuration for the RAG system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable naming a TOML config file
pub const CONFIG_ENV: &str = "FAQ_RAG_CONFIG";

/// Config file looked up in the working directory when `FAQ_RAG_CONFIG` is unset
pub const DEFAULT_CONFIG_FILE: &str = "faq-rag.toml";

/// Main RAG system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Ollama/LLM configuration
    pub llm: LlmConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Retrieval stage configuration
    pub retrieval: RetrievalConfig,
    /// Validation stage configuration
    pub validation: ValidationConfig,
    /// Orchestrator configuration
    pub pipeline: PipelineConfig,
    /// Persisted index location
    pub index: IndexConfig,
}

impl RagConfig {
    /// Parse a TOML config file; missing sections fall back to defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| Error::config(format!("Failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `$FAQ_RAG_CONFIG`, then `./faq-rag.toml`, then defaults
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            tracing::info!("Loading configuration from {} ({})", path, CONFIG_ENV);
            return Self::from_file(path);
        }

        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            tracing::info!("Loading configuration from {}", local.display());
            return Self::from_file(local);
        }

        tracing::info!("No config file found, using defaults");
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be at least 1"));
        }
        if self.validation.min_results == 0 {
            return Err(Error::config("validation.min_results must be at least 1"));
        }
        if self.pipeline.provider_timeout_secs == 0 {
            return Err(Error::config("pipeline.provider_timeout_secs must be at least 1"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::config("llm.timeout_secs must be at least 1"));
        }
        if self.llm.max_retries > MAX_RETRIES {
            return Err(Error::config(format!(
                "llm.max_retries must be at most {}",
                MAX_RETRIES
            )));
        }
        Ok(())
    }
}

/// Upper bound for `llm.max_retries`
pub const MAX_RETRIES: u32 = 10;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Answer bare greetings without running the pipeline
    pub greeting_shortcut: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            greeting_shortcut: true,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "llama3.2:3b".to_string(),
            temperature: 0.1, // Factual answers only
            max_tokens: 500,
            timeout_secs: 30,
            max_retries: 0,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Expected embedding dimensions; 0 takes the value from the loaded index
    pub dimensions: usize,
}

/// Retrieval stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 3 }
    }
}

/// Validation stage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Fewer retrieved chunks than this refuses the query
    pub min_results: usize,
    /// Lowercase substrings that mark a query as in-domain
    pub domain_keywords: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_results: 1,
            domain_keywords: [
                "medicare",
                "medicaid",
                "health",
                "medical",
                "insurance",
                "coverage",
                "hospital",
                "doctor",
                "prescription",
                "drug",
                "eligib",
                "enroll",
                "premium",
                "deductible",
                "benefit",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on any single embedding or generation call, in seconds
    pub provider_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            provider_timeout_secs: 30,
        }
    }
}

impl PipelineConfig {
    /// Provider timeout as a `Duration`
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

/// Persisted index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory holding `embeddings.bin` and `chunks.json`
    pub dir: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        let dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("faq-rag")
            .join("index");

        Self { dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = RagConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.validation.min_results, 1);
        assert!(config.validation.domain_keywords.iter().any(|k| k == "medicare"));
        assert_eq!(config.pipeline.provider_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[retrieval]
top_k = 5

[llm]
generate_model = "phi3"
"#
        )
        .unwrap();

        let config = RagConfig::from_file(file.path()).unwrap();
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.llm.generate_model, "phi3");
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.server.port, 8000);
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retrieval]\ntop_k = 0").unwrap();

        let err = RagConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_excessive_retries_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[llm]\nmax_retries = 64").unwrap();

        let err = RagConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let mut config = RagConfig::default();
        config.llm.max_retries = MAX_RETRIES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retrieval\ntop_k = ").unwrap();

        assert!(matches!(
            RagConfig::from_file(file.path()).unwrap_err(),
            Error::Config(_)
        ));
    }
}
