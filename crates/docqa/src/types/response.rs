//! Response types for the ask endpoint

use serde::{Deserialize, Serialize};

use crate::generation::Answer;
use crate::retrieval::RetrievalHit;
use crate::types::Strategy;

/// Longest snippet returned per source
const SNIPPET_LEN: usize = 300;

/// A retrieved chunk as shown under the answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSnippet {
    /// Chunk position in the session
    pub chunk_index: usize,
    /// Page number (if applicable)
    pub page: Option<u32>,
    /// Cosine similarity to the question
    pub score: f32,
    /// Leading text of the chunk
    pub snippet: String,
}

impl SourceSnippet {
    pub fn from_hit(hit: &RetrievalHit) -> Self {
        Self {
            chunk_index: hit.chunk.index,
            page: hit.chunk.page,
            score: hit.score,
            snippet: truncate_snippet(&hit.chunk.text, SNIPPET_LEN),
        }
    }
}

/// Successful answer to one submit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Generated answer text
    pub answer: String,
    /// Chunks the answer was grounded on
    pub sources: Vec<SourceSnippet>,
    /// Combination strategy used
    pub strategy: Strategy,
    /// Number of chunks requested
    pub k: usize,
    /// Processing time in milliseconds
    pub processing_time_ms: u64,
}

impl AskResponse {
    pub fn new(answer: Answer, strategy: Strategy, k: usize, processing_time_ms: u64) -> Self {
        Self {
            sources: answer.sources.iter().map(SourceSnippet::from_hit).collect(),
            answer: answer.text,
            strategy,
            k,
            processing_time_ms,
        }
    }
}

/// Truncate snippet to a maximum length in characters, preferring a word boundary
pub fn truncate_snippet(snippet: &str, max_chars: usize) -> String {
    let Some((end, _)) = snippet.char_indices().nth(max_chars) else {
        return snippet.to_string();
    };

    if let Some(pos) = snippet[..end].rfind(' ') {
        return format!("{}...", &snippet[..pos]);
    }

    format!("{}...", &snippet[..end])
}
