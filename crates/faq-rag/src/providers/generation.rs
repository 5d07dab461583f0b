//! Generation provider trait for grounded completions

use async_trait::async_trait;

use crate::error::Result;

/// Grounded-completion boundary
///
/// Any failure must surface as `Error::GenerationUnavailable`.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Complete `query` using only `context`, following `instruction`
    async fn complete(&self, instruction: &str, context: &str, query: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
