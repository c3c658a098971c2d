//! Similarity search over the chunks of one session

mod index;

pub use index::{cosine_similarity, RetrievalHit, VectorIndex};

use std::sync::Arc;

use crate::error::Result;
use crate::providers::EmbeddingProvider;
use crate::types::ApiKey;

/// Question-to-chunks lookup bound to one session's index and key
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    key: ApiKey,
    index: VectorIndex,
    k: usize,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, key: ApiKey, index: VectorIndex, k: usize) -> Self {
        Self { embedder, key, index, k }
    }

    /// Embed the question and return at most `k` hits, best first
    pub async fn retrieve(&self, question: &str) -> Result<Vec<RetrievalHit>> {
        let query = self.embedder.embed(&self.key, question).await?;
        let hits = self.index.query(&query, self.k);
        tracing::debug!(
            "Retrieved {} of {} chunks (k={})",
            hits.len(),
            self.index.len(),
            self.k
        );
        Ok(hits)
    }
}
