//! Format-specific document loading

use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::types::{Document, MediaType};

use super::ocr::OcrEngine;

/// Turns a saved upload into text documents
pub trait DocumentLoader: Send + Sync {
    /// Load the file at `path` according to its declared media type
    ///
    /// `source` is the name reported in document metadata and read errors.
    /// Unsupported types fail with [`Error::UnsupportedType`] and yield nothing.
    fn load_document(
        &self,
        path: &Path,
        declared_media_type: &str,
        source: &str,
    ) -> Result<Vec<Document>>;
}

/// Loader dispatching on the declared media type
pub struct FileLoader {
    ocr: Arc<dyn OcrEngine>,
}

impl FileLoader {
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Load a file whose media type is already resolved
    pub fn load(&self, path: &Path, media_type: MediaType, source: &str) -> Result<Vec<Document>> {
        tracing::debug!("Loading {} as {}", source, media_type.display_name());

        match media_type {
            MediaType::Pdf => load_pdf(path, source),
            MediaType::Text => load_text(path, source),
            MediaType::Csv => load_csv(path, source),
            MediaType::Docx => load_docx(path, source),
            MediaType::Jpeg | MediaType::Png => {
                tracing::debug!("Running {} OCR on {}", self.ocr.name(), source);
                let text = self
                    .ocr
                    .recognize(path)
                    .map_err(|e| match e {
                        Error::DocumentRead { message, .. } => Error::document_read(source, message),
                        other => other,
                    })?;
                Ok(vec![Document::new(text, source)])
            }
        }
    }
}

impl DocumentLoader for FileLoader {
    fn load_document(
        &self,
        path: &Path,
        declared_media_type: &str,
        source: &str,
    ) -> Result<Vec<Document>> {
        let media_type = MediaType::from_mime(declared_media_type)?;
        self.load(path, media_type, source)
    }
}

fn read_bytes(path: &Path, source: &str) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::document_read(source, e.to_string()))
}

/// One document per page
fn load_pdf(path: &Path, source: &str) -> Result<Vec<Document>> {
    let pdf = lopdf::Document::load(path).map_err(|e| Error::document_read(source, e.to_string()))?;

    let pages = pdf.get_pages();
    if pages.is_empty() {
        return Err(Error::document_read(source, "PDF has no pages"));
    }

    let mut documents = Vec::with_capacity(pages.len());
    for &page_number in pages.keys() {
        let text = match pdf.extract_text(&[page_number]) {
            Ok(text) => text.replace('\0', ""),
            Err(e) => {
                tracing::warn!("No text extracted from page {} of {}: {}", page_number, source, e);
                String::new()
            }
        };
        documents.push(Document::new(text, source).with_page(page_number));
    }

    tracing::info!("Loaded {} pages from {}", documents.len(), source);
    Ok(documents)
}

fn load_text(path: &Path, source: &str) -> Result<Vec<Document>> {
    let data = read_bytes(path, source)?;
    let content = String::from_utf8_lossy(&data).to_string();
    Ok(vec![Document::new(content, source)])
}

/// Whole table rendered as one text block
fn load_csv(path: &Path, source: &str) -> Result<Vec<Document>> {
    let data = read_bytes(path, source)?;
    let mut reader = csv::Reader::from_reader(data.as_slice());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::document_read(source, e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(Error::document_read(source, "No columns to parse from file"));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::document_read(source, e.to_string()))?;
        rows.push(record.iter().map(|v| v.to_string()).collect::<Vec<_>>());
    }

    Ok(vec![Document::new(render_table(&headers, &rows), source)])
}

/// Render rows as an aligned table with a leading row index
///
/// Values are right-aligned per column and separated by two spaces.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return format!("Empty table\nColumns: [{}]\nIndex: []", headers.join(", "));
    }

    let index_width = (rows.len() - 1).to_string().len();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|v| v.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let mut header_line = " ".repeat(index_width);
    for (header, width) in headers.iter().zip(&widths) {
        header_line.push_str(&format!("  {:>width$}", header, width = *width));
    }
    lines.push(header_line);

    for (i, row) in rows.iter().enumerate() {
        let mut line = format!("{:<width$}", i, width = index_width);
        for (col, width) in widths.iter().enumerate() {
            let value = row.get(col).map(String::as_str).unwrap_or("");
            line.push_str(&format!("  {:>width$}", value, width = *width));
        }
        lines.push(line);
    }

    lines.join("\n")
}

/// Paragraph texts joined with newlines
fn load_docx(path: &Path, source: &str) -> Result<Vec<Document>> {
    let data = read_bytes(path, source)?;
    let docx = docx_rs::read_docx(&data).map_err(|e| Error::document_read(source, e.to_string()))?;

    let mut paragraphs = Vec::new();
    for child in &docx.document.children {
        if let docx_rs::DocumentChild::Paragraph(p) = child {
            let mut text = String::new();
            for child in &p.children {
                if let docx_rs::ParagraphChild::Run(run) = child {
                    for child in &run.children {
                        if let docx_rs::RunChild::Text(t) = child {
                            text.push_str(&t.text);
                        }
                    }
                }
            }
            paragraphs.push(text);
        }
    }

    Ok(vec![Document::new(paragraphs.join("\n"), source)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FixedOcr(&'static str);

    struct BrokenOcr;

    impl OcrEngine for BrokenOcr {
        fn recognize(&self, path: &Path) -> Result<String> {
            Err(Error::document_read(
                path.to_string_lossy(),
                "OCR failed: unreadable image",
            ))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    impl OcrEngine for FixedOcr {
        fn recognize(&self, _path: &Path) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn loader() -> FileLoader {
        FileLoader::new(Arc::new(FixedOcr("text from the picture")))
    }

    fn write_temp(suffix: &str, data: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(data).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_render_table() {
        let headers = vec!["name".to_string(), "age".to_string()];
        let rows = vec![
            vec!["Alice".to_string(), "30".to_string()],
            vec!["Bob".to_string(), "7".to_string()],
        ];
        assert_eq!(
            render_table(&headers, &rows),
            "    name  age\n0  Alice   30\n1    Bob    7"
        );
    }

    #[test]
    fn test_render_empty_table() {
        let headers = vec!["a".to_string(), "b".to_string()];
        assert_eq!(
            render_table(&headers, &[]),
            "Empty table\nColumns: [a, b]\nIndex: []"
        );
    }

    #[test]
    fn test_load_text() {
        let file = write_temp(".txt", "héllo\nworld".as_bytes());
        let docs = loader().load_document(file.path(), "text/plain", "notes.txt").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata.source, "notes.txt");
        assert_eq!(docs[0].content, "héllo\nworld");
        assert_eq!(docs[0].metadata.page, None);
    }

    #[test]
    fn test_load_csv() {
        let file = write_temp(".csv", b"city,population\nLisbon,545000\nPorto,232000\n");
        let docs = loader().load_document(file.path(), "text/csv", "cities.csv").unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].content.contains("Lisbon"));
        assert!(docs[0].content.starts_with("     city  population"));
    }

    #[test]
    fn test_load_ragged_csv_is_read_error() {
        let file = write_temp(".csv", b"a,b\n1,2,3\n");
        let err = loader().load_document(file.path(), "text/csv", "cities.csv").unwrap_err();
        assert!(matches!(err, Error::DocumentRead { .. }));
    }

    #[test]
    fn test_load_image_uses_ocr() {
        let file = write_temp(".png", b"\x89PNG fake");
        let docs = loader().load_document(file.path(), "image/png", "photo.png").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].content, "text from the picture");
    }

    #[test]
    fn test_ocr_failure_reports_upload_name() {
        let file = write_temp(".jpeg", b"not an image");
        let err = FileLoader::new(Arc::new(BrokenOcr))
            .load_document(file.path(), "image/jpeg", "receipt.jpeg")
            .unwrap_err();
        assert_eq!(err.detail(), "receipt.jpeg: OCR failed: unreadable image");
    }

    #[test]
    fn test_unsupported_type() {
        let file = write_temp(".bmp", b"BM fake");
        let err = loader().load_document(file.path(), "image/bmp", "scan.bmp").unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
    }

    #[test]
    fn test_invalid_pdf_is_read_error() {
        let file = write_temp(".pdf", b"this is not a pdf");
        let err = loader()
            .load_document(file.path(), "application/pdf", "report.pdf")
            .unwrap_err();
        assert!(matches!(err, Error::DocumentRead { ref filename, .. } if filename == "report.pdf"));
    }

    #[test]
    fn test_invalid_docx_is_read_error() {
        let file = write_temp(".docx", b"PK not really a zip");
        let err = loader()
            .load_document(file.path(), MediaType::Docx.mime(), "memo.docx")
            .unwrap_err();
        assert!(matches!(err, Error::DocumentRead { .. }));
    }
}
