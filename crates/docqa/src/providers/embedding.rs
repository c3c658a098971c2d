//! Embedding provider trait for generating text embeddings

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::types::ApiKey;

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OpenAiClient`: hosted `/embeddings` endpoint
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for multiple texts, one per input, in input order
    async fn embed_batch(&self, key: &ApiKey, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate embedding for a single text
    async fn embed(&self, key: &ApiKey, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(key, &[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::service(self.name(), "empty embedding response"))
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
