//! Optical character recognition for image uploads

use std::path::Path;
use std::process::Command;

use crate::config::OcrConfig;
use crate::error::{Error, Result};

/// Extracts text from an image file
pub trait OcrEngine: Send + Sync {
    /// Recognize the text in the image at `path`
    fn recognize(&self, path: &Path) -> Result<String>;

    /// Engine name for logging
    fn name(&self) -> &str;
}

/// OCR through the `tesseract` command line tool
pub struct TesseractOcr {
    command: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            command: config.command.clone(),
            language: config.language.clone(),
        }
    }

    /// Check if the tesseract binary can be launched
    pub fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, path: &Path) -> Result<String> {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());

        let output = Command::new(&self.command)
            .arg(path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .map_err(|e| {
                Error::document_read(
                    &filename,
                    format!(
                        "could not run {} ({}). Install with: apt install tesseract-ocr",
                        self.command, e
                    ),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::document_read(
                filename,
                format!("OCR failed: {}", stderr.trim()),
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).to_string();
        tracing::info!("OCR extracted {} characters", text.len());
        Ok(text)
    }

    fn name(&self) -> &str {
        "tesseract"
    }
}
