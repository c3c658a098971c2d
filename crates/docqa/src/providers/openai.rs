//! OpenAI-compatible client for embeddings and chat completions

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::QaConfig;
use crate::error::{Error, Result};
use crate::types::ApiKey;

use super::embedding::EmbeddingProvider;
use super::llm::{ChatMessage, LlmProvider};

const SERVICE: &str = "openai";

/// HTTP client for an OpenAI-compatible API
///
/// Holds no credential: every call receives the key of the session it serves.
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    embed_model: String,
    chat_model: String,
    temperature: f32,
    batch_size: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiClient {
    /// Create a client from configuration
    pub fn new(config: &QaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.openai.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            base_url: config.openai.base_url.trim_end_matches('/').to_string(),
            embed_model: config.embeddings.model.clone(),
            chat_model: config.openai.chat_model.clone(),
            temperature: config.openai.temperature,
            batch_size: config.embeddings.batch_size.max(1),
        })
    }

    async fn post<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        key: &ApiKey,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(key.expose())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::service(SERVICE, format!("request to {} failed: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("{} returned HTTP {}", path, status);
            return Err(classify_failure(status, &body));
        }

        response
            .json()
            .await
            .map_err(|e| Error::service(SERVICE, format!("failed to parse {} response: {}", path, e)))
    }

    async fn embed_one_batch(&self, key: &ApiKey, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.embed_model,
            input: texts,
        };
        let response: EmbeddingResponse = self.post(key, "/embeddings", &request).await?;

        if response.data.len() != texts.len() {
            return Err(Error::service(
                SERVICE,
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    response.data.len()
                ),
            ));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Map a non-success HTTP response to the error taxonomy
pub fn classify_failure(status: StatusCode, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| {
            if body.trim().is_empty() {
                status.to_string()
            } else {
                body.trim().to_string()
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Authentication(detail),
        StatusCode::BAD_REQUEST
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNPROCESSABLE_ENTITY => Error::BadRequest(detail),
        _ => Error::service(SERVICE, format!("HTTP {}: {}", status.as_u16(), detail)),
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed_batch(&self, key: &ApiKey, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            "Embedding {} texts with {} (batch size {})",
            texts.len(),
            self.embed_model,
            self.batch_size
        );

        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.embed_one_batch(key, batch).await?);
        }
        Ok(embeddings)
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    async fn chat(&self, key: &ApiKey, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages,
            temperature: self.temperature,
        };

        tracing::info!("Requesting completion from {}", self.chat_model);
        let response: ChatResponse = self.post(key, "/chat/completions", &request).await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::service(SERVICE, "completion contained no message"))
    }

    fn name(&self) -> &str {
        SERVICE
    }

    fn model(&self) -> &str {
        &self.chat_model
    }
}
