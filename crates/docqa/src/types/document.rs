//! Uploaded files, loaded documents and chunks

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Supported upload formats, keyed by declared MIME type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    /// PDF document
    Pdf,
    /// Plain text file
    Text,
    /// CSV table
    Csv,
    /// Microsoft Word document (.docx)
    Docx,
    /// JPEG image (OCR)
    Jpeg,
    /// PNG image (OCR)
    Png,
}

impl MediaType {
    pub const ALL: [MediaType; 6] = [
        Self::Pdf,
        Self::Text,
        Self::Csv,
        Self::Docx,
        Self::Jpeg,
        Self::Png,
    ];

    /// Resolve a declared MIME string
    ///
    /// Parameters such as `; charset=utf-8` are ignored and `image/jpg` is
    /// accepted for JPEG since some browsers send it.
    pub fn from_mime(mime: &str) -> Result<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            "application/pdf" => Ok(Self::Pdf),
            "text/plain" => Ok(Self::Text),
            "text/csv" => Ok(Self::Csv),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Ok(Self::Docx)
            }
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/png" => Ok(Self::Png),
            _ => Err(Error::UnsupportedType(if essence.is_empty() {
                "(none)".to_string()
            } else {
                essence
            })),
        }
    }

    /// Canonical MIME string
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Text => "text/plain",
            Self::Csv => "text/csv",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// File extension used for the temporary copy
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "txt",
            Self::Csv => "csv",
            Self::Docx => "docx",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Text => "Text File",
            Self::Csv => "CSV",
            Self::Docx => "Word Document (.docx)",
            Self::Jpeg => "JPEG Image",
            Self::Png => "PNG Image",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// A file as received from the upload form
#[derive(Clone)]
pub struct UploadedFile {
    /// Original filename as uploaded by user
    pub name: String,
    /// Declared MIME type, unvalidated
    pub content_type: String,
    /// Raw content
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("name", &self.name)
            .field("content_type", &self.content_type)
            .field("len", &self.data.len())
            .finish()
    }
}

/// A unit of loaded text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Extracted text
    pub content: String,
    /// Where the text came from
    pub metadata: DocumentMetadata,
}

/// Source information attached to a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Original filename
    pub source: String,
    /// 1-based page number for paginated formats
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: DocumentMetadata {
                source: source.into(),
                page: None,
            },
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.metadata.page = Some(page);
        self
    }
}

/// A bounded slice of one document's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Position of the source document in the loader output
    pub document_index: usize,
    /// Position of this chunk across the whole session
    pub index: usize,
    /// Chunk text
    pub text: String,
    /// Page of the source document, if any
    pub page: Option<u32>,
}

impl Chunk {
    pub fn new(document_index: usize, index: usize, text: String, page: Option<u32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            document_index,
            index,
            text,
            page,
        }
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
