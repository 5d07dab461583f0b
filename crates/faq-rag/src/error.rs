//! Error types for the RAG system

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use faq_index::IndexError;
use serde_json::json;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG system errors
///
/// A refused answer is not an error: it is a normal pipeline outcome.
/// Everything here is a fault that aborts the current query.
#[derive(Debug, Error)]
pub enum Error {
    /// Vector index misuse (dimension, k, corrupt artifacts)
    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    /// Embedding provider failed or timed out
    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// Generation provider failed or timed out
    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad request from an API caller
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::EmbeddingUnavailable(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::GenerationUnavailable(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the fault came from an external provider
    pub fn is_provider_fault(&self) -> bool {
        matches!(
            self,
            Self::EmbeddingUnavailable(_) | Self::GenerationUnavailable(_)
        )
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Index(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "index_error",
                err.to_string(),
            ),
            Error::EmbeddingUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "embedding_unavailable",
                "The embedding service is unavailable. Please try again later.".to_string(),
            ),
            Error::GenerationUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "generation_unavailable",
                "The answer service is unavailable. Please try again later.".to_string(),
            ),
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg.clone()),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
