//! Error types for index construction, search and persistence

use thiserror::Error;

/// Result type alias for index operations
pub type Result<T> = std::result::Result<T, IndexError>;

/// Index errors
///
/// Construction and query misuse (`EmptyInput`, `DimensionMismatch`, `InvalidK`, ...)
/// are caller errors and are never retried.
#[derive(Debug, Error)]
pub enum IndexError {
    /// No chunks were given to `build`
    #[error("Cannot build an index from zero chunks")]
    EmptyInput,

    /// A vector's length differs from the index dimension
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// `k` must be at least 1
    #[error("Invalid k: must be greater than zero")]
    InvalidK,

    /// Chunk and embedding sequences are not parallel
    #[error("Length mismatch: {chunks} chunks but {embeddings} embeddings")]
    LengthMismatch { chunks: usize, embeddings: usize },

    /// First embedding has no components
    #[error("Embeddings must have at least one dimension")]
    ZeroDimension,

    /// NaN or infinite component (row is `None` for a query vector)
    #[error("Non-finite value in vector (row: {row:?})")]
    NonFinite { row: Option<usize> },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Buffer encoding error
    #[error("Failed to encode embedding buffer: {0}")]
    Encode(String),

    /// Buffer decoding error
    #[error("Failed to decode embedding buffer: {0}")]
    Decode(String),

    /// Persisted artifacts disagree with each other
    #[error("Corrupt index: {0}")]
    Corrupt(String),
}

impl IndexError {
    /// Create a corrupt index error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }
}
