//! Document ingestion: staging, loading and splitting

mod loader;
mod ocr;
mod splitter;
mod staging;

pub use loader::{render_table, DocumentLoader, FileLoader};
pub use ocr::{OcrEngine, TesseractOcr};
pub use splitter::{CharacterSplitter, TextSplitter};
pub use staging::stage_upload;
