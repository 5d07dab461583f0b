//! faq-index: exact nearest-neighbor search over dense embeddings
//!
//! A flat, immutable index for knowledge-base scale collections. Chunks and
//! their embeddings are fixed at build time; queries compute squared
//! euclidean distance against every row and return the k closest.

pub mod distance;
pub mod error;
pub mod index;
pub mod storage;
pub mod types;

pub use error::{IndexError, Result};
pub use index::VectorIndex;
pub use types::{Chunk, SearchResult};
