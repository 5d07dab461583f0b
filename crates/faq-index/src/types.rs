//! Chunk metadata and search results

use serde::{Deserialize, Serialize};

/// An immutable unit of retrievable text
///
/// The embedding is not stored here: it lives in the index buffer at the
/// row matching the chunk's position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk identifier (e.g. `faq_001_chunk_1`)
    pub id: String,
    /// Category label, reported back to callers as a source
    pub category: String,
    /// Source label (where the text came from)
    pub source: String,
    /// Raw text
    pub text: String,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        source: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            source: source.into(),
            text: text.into(),
        }
    }
}

/// One hit from [`VectorIndex::search`](crate::VectorIndex::search)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult<'a> {
    /// The matched chunk
    pub chunk: &'a Chunk,
    /// Row of the chunk inside the index
    pub position: usize,
    /// Squared euclidean distance (non-negative, lower is more similar)
    pub distance: f32,
    /// 0-based rank among the returned results
    pub rank: usize,
}
