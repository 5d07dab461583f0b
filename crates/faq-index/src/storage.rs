//! On-disk layout: two paired artifacts in one directory
//!
//! - `embeddings.bin`: bincode-encoded dense buffer keyed by row index
//! - `chunks.json`: chunk metadata, same length and order as the buffer rows
//!
//! Both are written at build time and loaded together; loading validates
//! that they agree before the index is usable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{IndexError, Result};
use crate::index::VectorIndex;
use crate::types::Chunk;

/// Buffer file name
pub const EMBEDDINGS_FILE: &str = "embeddings.bin";
/// Metadata file name
pub const CHUNKS_FILE: &str = "chunks.json";

/// Serialized form of the embedding buffer
#[derive(Debug, Serialize, Deserialize)]
struct EmbeddingBuffer {
    dimensions: usize,
    rows: usize,
    /// Row-major, `rows * dimensions` floats
    data: Vec<f32>,
}

impl VectorIndex {
    /// Write both artifacts into `dir` (created if missing)
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let buffer = EmbeddingBuffer {
            dimensions: self.dimensions(),
            rows: self.len(),
            data: self.as_flat().to_vec(),
        };
        let bytes = bincode::serde::encode_to_vec(&buffer, bincode::config::standard())
            .map_err(|e| IndexError::Encode(e.to_string()))?;
        fs::write(dir.join(EMBEDDINGS_FILE), bytes)?;

        let metadata = serde_json::to_string_pretty(self.chunks())?;
        fs::write(dir.join(CHUNKS_FILE), metadata)?;

        tracing::info!(
            "Saved index ({} chunks, {} dimensions) to {}",
            self.len(),
            self.dimensions(),
            dir.display()
        );
        Ok(())
    }

    /// Load both artifacts from `dir` and validate them against each other
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        let bytes = fs::read(dir.join(EMBEDDINGS_FILE))?;
        let (buffer, _): (EmbeddingBuffer, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())
                .map_err(|e| IndexError::Decode(e.to_string()))?;

        let metadata = fs::read_to_string(dir.join(CHUNKS_FILE))?;
        let chunks: Vec<Chunk> = serde_json::from_str(&metadata)?;

        if buffer.rows != chunks.len() {
            return Err(IndexError::corrupt(format!(
                "{} holds {} rows but {} lists {} chunks",
                EMBEDDINGS_FILE,
                buffer.rows,
                CHUNKS_FILE,
                chunks.len()
            )));
        }

        let index = VectorIndex::from_flat(chunks, buffer.data, buffer.dimensions)?;
        tracing::info!(
            "Vector store loaded with {} vectors ({} dimensions)",
            index.len(),
            index.dimensions()
        );
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> VectorIndex {
        VectorIndex::build(
            vec![
                Chunk::new("faq_001_chunk_1", "Eligibility", "cms.gov", "Question: who\nAnswer: 65+"),
                Chunk::new("faq_002_chunk_1", "Cost", "cms.gov", "Question: how much\nAnswer: varies"),
            ],
            vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]],
        )
        .unwrap()
    }

    #[test]
    fn test_save_then_load_preserves_rows() {
        let dir = tempfile::tempdir().unwrap();
        let index = sample_index();
        index.save(dir.path()).unwrap();

        let loaded = VectorIndex::load(dir.path()).unwrap();
        assert_eq!(loaded.chunks(), index.chunks());
        assert_eq!(loaded.as_flat(), index.as_flat());
        assert_eq!(loaded.dimensions(), 3);

        let hit = loaded.search(&[0.4, 0.5, 0.6], 1).unwrap();
        assert_eq!(hit[0].chunk.id, "faq_002_chunk_1");
    }

    #[test]
    fn test_load_rejects_mismatched_metadata() {
        let dir = tempfile::tempdir().unwrap();
        sample_index().save(dir.path()).unwrap();

        // Drop one chunk from the metadata so the artifacts disagree
        let one = vec![Chunk::new("only", "Cost", "cms.gov", "text")];
        fs::write(
            dir.path().join(CHUNKS_FILE),
            serde_json::to_string(&one).unwrap(),
        )
        .unwrap();

        let err = VectorIndex::load(dir.path()).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(_)));
    }

    #[test]
    fn test_load_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = VectorIndex::load(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, IndexError::Io(_)));
    }

    #[test]
    fn test_load_rejects_overflowing_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        sample_index().save(dir.path()).unwrap();

        let forged = EmbeddingBuffer {
            dimensions: 1 << 63,
            rows: 2,
            data: Vec::new(),
        };
        let bytes = bincode::serde::encode_to_vec(&forged, bincode::config::standard()).unwrap();
        fs::write(dir.path().join(EMBEDDINGS_FILE), bytes).unwrap();

        let err = VectorIndex::load(dir.path()).unwrap_err();
        assert!(matches!(err, IndexError::Corrupt(_)));
    }

    #[test]
    fn test_load_rejects_short_buffer() {
        let dir = tempfile::tempdir().unwrap();
        sample_index().save(dir.path()).unwrap();

        let short = EmbeddingBuffer {
            dimensions: 3,
            rows: 2,
            data: vec![0.1, 0.2, 0.3],
        };
        let bytes = bincode::serde::encode_to_vec(&short, bincode::config::standard()).unwrap();
        fs::write(dir.path().join(EMBEDDINGS_FILE), bytes).unwrap();

        assert!(matches!(
            VectorIndex::load(dir.path()).unwrap_err(),
            IndexError::Corrupt(_)
        ));
    }

    #[test]
    fn test_load_rejects_garbage_buffer() {
        let dir = tempfile::tempdir().unwrap();
        sample_index().save(dir.path()).unwrap();
        fs::write(dir.path().join(EMBEDDINGS_FILE), [0xff_u8; 3]).unwrap();

        assert!(VectorIndex::load(dir.path()).is_err());
    }
}
