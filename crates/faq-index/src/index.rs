//! Exact (brute-force) nearest-neighbor index
//!
//! Every query scans all N rows: O(N·D). This is fine at knowledge-base
//! scale and keeps results exact and deterministic.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

use crate::distance::euclidean_distance_squared;
use crate::error::{IndexError, Result};
use crate::types::{Chunk, SearchResult};

/// When `k * FULL_SORT_RATIO >= N` a full sort beats the bounded heap
const FULL_SORT_RATIO: usize = 4;

/// Immutable vector index: chunks plus a parallel N×D embedding buffer
///
/// Row `i` of the buffer always belongs to `chunks[i]`. Nothing mutates the
/// index after construction, so it can be shared across threads freely.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    /// Row-major embeddings, `chunks.len() * dimensions` floats
    data: Vec<f32>,
    dimensions: usize,
}

/// Scored row. Orders by distance, then by insertion position so ties are stable.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    distance: f32,
    position: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.position.cmp(&other.position))
    }
}

impl VectorIndex {
    /// Build an index from chunks and their embeddings (same order)
    pub fn build(chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(IndexError::EmptyInput);
        }
        if chunks.len() != embeddings.len() {
            return Err(IndexError::LengthMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let dimensions = embeddings[0].len();
        if dimensions == 0 {
            return Err(IndexError::ZeroDimension);
        }

        let mut data = Vec::with_capacity(chunks.len() * dimensions);
        for (row, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != dimensions {
                return Err(IndexError::DimensionMismatch {
                    expected: dimensions,
                    actual: embedding.len(),
                });
            }
            if embedding.iter().any(|v| !v.is_finite()) {
                return Err(IndexError::NonFinite { row: Some(row) });
            }
            data.extend_from_slice(embedding);
        }

        tracing::debug!(
            "Built vector index: {} chunks x {} dimensions",
            chunks.len(),
            dimensions
        );

        Ok(Self {
            chunks,
            data,
            dimensions,
        })
    }

    /// Reassemble an index from a flat buffer (used when loading from disk)
    pub(crate) fn from_flat(chunks: Vec<Chunk>, data: Vec<f32>, dimensions: usize) -> Result<Self> {
        if chunks.is_empty() {
            return Err(IndexError::EmptyInput);
        }
        if dimensions == 0 {
            return Err(IndexError::ZeroDimension);
        }
        let expected = chunks.len().checked_mul(dimensions).ok_or_else(|| {
            IndexError::corrupt(format!(
                "{} rows x {} dimensions does not fit in memory",
                chunks.len(),
                dimensions
            ))
        })?;
        if data.len() != expected {
            return Err(IndexError::corrupt(format!(
                "buffer holds {} floats, expected {} ({} rows x {} dimensions)",
                data.len(),
                expected,
                chunks.len(),
                dimensions
            )));
        }
        if let Some(pos) = data.iter().position(|v| !v.is_finite()) {
            return Err(IndexError::NonFinite {
                row: Some(pos / dimensions),
            });
        }

        Ok(Self {
            chunks,
            data,
            dimensions,
        })
    }

    /// Find the `k` nearest chunks to `query`
    ///
    /// Returns `min(k, N)` results by ascending squared distance. Equal
    /// distances keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult<'_>>> {
        if k == 0 {
            return Err(IndexError::InvalidK);
        }
        if query.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
            });
        }
        if query.iter().any(|v| !v.is_finite()) {
            return Err(IndexError::NonFinite { row: None });
        }

        let k = k.min(self.len());
        let scored = self
            .data
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(position, row)| Candidate {
                distance: euclidean_distance_squared(query, row),
                position,
            });

        let top = if k * FULL_SORT_RATIO >= self.len() {
            let mut all: Vec<Candidate> = scored.collect();
            all.sort_unstable();
            all.truncate(k);
            all
        } else {
            // Max-heap of the k best so far; the root is the current worst
            let mut heap = BinaryHeap::with_capacity(k + 1);
            for candidate in scored {
                if heap.len() < k {
                    heap.push(candidate);
                } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                    heap.pop();
                    heap.push(candidate);
                }
            }
            heap.into_sorted_vec()
        };

        Ok(top
            .into_iter()
            .enumerate()
            .map(|(rank, c)| SearchResult {
                chunk: &self.chunks[c.position],
                position: c.position,
                distance: c.distance,
                rank,
            })
            .collect())
    }

    /// Number of indexed chunks
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Always false for a successfully built index
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Embedding dimension D
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// All chunks in insertion order
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Chunk at a given row
    pub fn chunk(&self, position: usize) -> Option<&Chunk> {
        self.chunks.get(position)
    }

    /// Embedding stored at a given row
    pub fn embedding(&self, position: usize) -> Option<&[f32]> {
        if position >= self.len() {
            return None;
        }
        let start = position * self.dimensions;
        Some(&self.data[start..start + self.dimensions])
    }

    /// The raw row-major buffer
    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }

    /// Distinct category labels, sorted
    pub fn categories(&self) -> Vec<String> {
        self.chunks
            .iter()
            .map(|c| c.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
