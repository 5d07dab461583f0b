//! Ollama-compatible HTTP client implementing both provider traits
//!
//! Retries live here at the boundary; the pipeline stages never retry.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::generation::PromptBuilder;

use super::embedding::EmbeddingProvider;
use super::generation::GenerationProvider;

/// Longest pause between two attempts
const MAX_BACKOFF_SECS: u64 = 30;

/// Pause before retry number `attempt + 1`: 1s, 2s, 4s, ... capped at `MAX_BACKOFF_SECS`
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt).min(MAX_BACKOFF_SECS))
}

/// Ollama API client with bounded retry
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: LlmConfig,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Run `operation` up to `max_retries + 1` times with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < max_retries => {
                    let delay = backoff_delay(attempt);
                    tracing::warn!(
                        "Request failed (attempt {}/{}): {}; retrying in {:?}",
                        attempt + 1,
                        max_retries.saturating_add(1),
                        e,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Check if the server answers at all
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn embed_once(&self, url: &str, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: &self.config.embed_model,
            prompt: text,
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::embedding(format!(
                "Embedding failed: HTTP {}",
                response.status()
            )));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))?;

        if body.embedding.is_empty() {
            return Err(Error::embedding("Embedding response was empty"));
        }
        Ok(body.embedding)
    }

    async fn generate_once(&self, url: &str, system: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.config.generate_model,
            system,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.config.temperature,
                num_predict: self.config.max_tokens,
            },
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::generation(format!("Generation request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::generation(format!(
                "Generation failed: HTTP {} - {}",
                status, body
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::generation(format!("Failed to parse generation response: {}", e)))?;

        Ok(body.response)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let url = url.as_str();
        self.retry_request(|| self.embed_once(url, text)).await
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

#[async_trait]
impl GenerationProvider for OllamaClient {
    async fn complete(&self, instruction: &str, context: &str, query: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.config.base_url);
        let prompt = PromptBuilder::build_user_prompt(context, query);
        let (url, prompt) = (url.as_str(), prompt.as_str());

        tracing::info!("Generating answer with model: {}", self.config.generate_model);

        self.retry_request(|| self.generate_once(url, instruction, prompt))
            .await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.config.generate_model
    }
}
