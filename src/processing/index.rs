//! In-memory vector index over one upload batch.
//!
//! Vectors are L2-normalized on insert so inner product equals cosine similarity. Search is an
//! exhaustive scan; a batch of PDFs rarely exceeds a few thousand chunks.

use super::types::{DocumentChunk, IndexError, ScoredChunk};

struct IndexedChunk {
    chunk: DocumentChunk,
    vector: Vec<f32>,
}

/// Immutable nearest-neighbour index built from a single batch of chunks.
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    dimension: Option<usize>,
}

impl VectorIndex {
    /// Pair chunks with their embeddings and normalize every vector.
    ///
    /// An empty batch yields a valid index that answers every query with no matches.
    pub fn build(chunks: Vec<DocumentChunk>, vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        if chunks.len() != vectors.len() {
            return Err(IndexError::CountMismatch {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }

        let mut dimension = None;
        let mut entries = Vec::with_capacity(chunks.len());

        for (position, (chunk, mut vector)) in chunks.into_iter().zip(vectors).enumerate() {
            if vector.is_empty() {
                return Err(IndexError::EmptyVector { position });
            }
            let expected = *dimension.get_or_insert(vector.len());
            if vector.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    actual: vector.len(),
                });
            }
            normalize(&mut vector);
            entries.push(IndexedChunk { chunk, vector });
        }

        Ok(Self { entries, dimension })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Vector dimension, or `None` for an empty index.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    /// Return at most `k` chunks ranked by descending similarity to `query`.
    ///
    /// Ties keep insertion order. The caller is responsible for matching dimensions.
    pub fn query(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        if k == 0 || self.entries.is_empty() {
            return Vec::new();
        }

        let mut query = query.to_vec();
        normalize(&mut query);

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (position, dot(&entry.vector, &query)))
            .collect();
        scored.sort_by(|left, right| {
            right
                .1
                .total_cmp(&left.1)
                .then_with(|| left.0.cmp(&right.0))
        });

        scored
            .into_iter()
            .take(k)
            .map(|(position, score)| ScoredChunk {
                chunk: self.entries[position].chunk.clone(),
                score,
            })
            .collect()
    }
}

fn dot(left: &[f32], right: &[f32]) -> f32 {
    left.iter().zip(right).map(|(a, b)| a * b).sum()
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
