//! Scoped temporary copies of uploads
//!
//! Readers work on paths, so each upload is written to a temporary file that
//! lives exactly as long as the returned handle. Dropping the handle deletes
//! the file on success, on error and on panic unwinding alike.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::types::{MediaType, UploadedFile};

/// Write the upload to a fresh temporary file
pub fn stage_upload(file: &UploadedFile) -> Result<NamedTempFile> {
    let suffix = MediaType::from_mime(&file.content_type)
        .map(|m| format!(".{}", m.extension()))
        .unwrap_or_default();

    let mut temp = tempfile::Builder::new()
        .prefix("docqa-")
        .suffix(&suffix)
        .tempfile()?;
    temp.write_all(&file.data)?;
    temp.flush()?;

    tracing::debug!(
        "Staged {} ({} bytes) at {}",
        file.name,
        file.data.len(),
        temp.path().display()
    );
    Ok(temp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staged_file_removed_on_drop() {
        let upload = UploadedFile::new("notes.txt", "text/plain", b"hello".to_vec());
        let temp = stage_upload(&upload).unwrap();
        let path = temp.path().to_path_buf();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        assert_eq!(path.extension().unwrap(), "txt");

        drop(temp);
        assert!(!path.exists());
    }

    #[test]
    fn test_unsupported_type_still_staged() {
        let upload = UploadedFile::new("pic.bmp", "image/bmp", b"BM".to_vec());
        let temp = stage_upload(&upload).unwrap();
        assert!(temp.path().extension().is_none());
    }
}
