//! Core types for the question-answering pipeline

pub mod document;
pub mod query;
pub mod response;

pub use document::{Chunk, Document, DocumentMetadata, MediaType, UploadedFile};
pub use query::{ApiKey, QuerySession, Strategy, SubmitForm};
pub use response::{AskResponse, SourceSnippet};
