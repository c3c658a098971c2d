//! Fixed-window text splitting

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// Splits loaded documents into chunks
pub trait TextSplitter: Send + Sync {
    /// Split documents in order; chunks never cross a document boundary
    fn split_documents(&self, documents: &[Document]) -> Vec<Chunk>;
}

/// Character windows of fixed size with optional overlap
#[derive(Debug, Clone)]
pub struct CharacterSplitter {
    /// Window size in characters
    chunk_size: usize,
    /// Characters shared by consecutive windows
    overlap: usize,
}

impl CharacterSplitter {
    /// Create a new splitter; overlap must be smaller than the window
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 || overlap >= chunk_size {
            return Err(Error::Config(format!(
                "invalid chunking window: size={} overlap={}",
                chunk_size, overlap
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn from_config(config: &ChunkingConfig) -> Result<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Split one text into windows, counting Unicode scalar values
    pub fn split_text<'a>(&self, text: &'a str) -> Vec<&'a str> {
        // Byte offset of every char start, plus the end of the string
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = bounds.len() - 1;
        let stride = self.chunk_size - self.overlap;

        let mut windows = Vec::new();
        let mut start = 0usize;
        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            windows.push(&text[bounds[start]..bounds[end]]);
            if end == char_count {
                break;
            }
            start += stride;
        }
        windows
    }
}

impl Default for CharacterSplitter {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 0,
        }
    }
}

impl TextSplitter for CharacterSplitter {
    fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        for (document_index, doc) in documents.iter().enumerate() {
            for window in self.split_text(&doc.content) {
                chunks.push(Chunk::new(
                    document_index,
                    chunks.len(),
                    window.to_string(),
                    doc.metadata.page,
                ));
            }
        }
        chunks
    }
}
