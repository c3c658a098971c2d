//! Provider abstractions for the hosted embedding and chat services
//!
//! The pipeline only sees the traits; the OpenAI-compatible client is the
//! production implementation and tests substitute recording fakes.

pub mod embedding;
pub mod llm;
pub mod openai;

pub use embedding::EmbeddingProvider;
pub use llm::{ChatMessage, LlmProvider, Role};
pub use openai::OpenAiClient;
