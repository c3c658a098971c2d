//! In-memory similarity index built fresh for every session

use crate::error::{Error, Result};
use crate::types::Chunk;

/// A chunk with its similarity to the query
#[derive(Debug, Clone)]
pub struct RetrievalHit {
    /// The matched chunk
    pub chunk: Chunk,
    /// Cosine similarity, higher is more similar
    pub score: f32,
}

/// Brute-force cosine index over one session's chunks
#[derive(Debug, Default)]
pub struct VectorIndex {
    entries: Vec<(Chunk, Vec<f32>)>,
}

impl VectorIndex {
    /// Pair each chunk with its embedding
    pub fn build(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.len() != vectors.len() {
            return Err(Error::internal(format!(
                "cannot index {} chunks with {} embeddings",
                chunks.len(),
                vectors.len()
            )));
        }

        Ok(Self {
            entries: chunks.into_iter().zip(vectors).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-k chunks by descending cosine similarity
    pub fn query(&self, query: &[f32], k: usize) -> Vec<RetrievalHit> {
        let mut scored: Vec<RetrievalHit> = self
            .entries
            .iter()
            .map(|(chunk, vector)| RetrievalHit {
                chunk: chunk.clone(),
                score: cosine_similarity(vector, query),
            })
            .collect();

        // Stable sort keeps document order among equal scores
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity; 0.0 if either vector has zero magnitude or the result is not finite
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let similarity = dot / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}
