//! docqa: question answering over a single uploaded document
//!
//! A file (PDF, plain text, CSV, DOCX, JPEG or PNG) is loaded into text, split into
//! fixed-size chunks, embedded through an OpenAI-compatible service and indexed in
//! memory. A question then retrieves the top-k chunks and a chat model combines them
//! into an answer with one of four strategies: stuff, map_reduce, refine or map_rerank.
//!
//! Nothing outlives a run: the index, the temp file and the API key are all scoped to
//! one submit.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod pipeline;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::QaConfig;
pub use error::{Error, ErrorKind, Result};
pub use pipeline::{Failure, Phase, PhaseMachine, QaPipeline, RunReport, Stage};
pub use types::{
    document::{Chunk, Document, MediaType, UploadedFile},
    query::{ApiKey, QuerySession, Strategy, SubmitForm},
    response::{AskResponse, SourceSnippet},
};
