//! Models for file uploads.

use super::{Validate, require_non_empty};
use crate::errors::{Error, Result};
use crate::types::StorageKey;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata of a stored file as reported by the upload endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    pub url: String,
    pub key: StorageKey,
    pub bucket: String,
    pub original_name: String,
    pub mime_type: String,
    /// Size in bytes
    pub size: u64,
}

impl Validate for FileMeta {
    fn validate(&self) -> std::result::Result<(), String> {
        require_non_empty("key", &self.key)?;
        require_non_empty("url", &self.url)
    }
}

/// A file ready to be sent as one multipart part.
///
/// No size or type checks happen here; limits are enforced by the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: String,
    pub contents: Bytes,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path).await.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_guess::from_path(path).first_or_octet_stream().essence_str().to_string();

        Ok(Self::new(file_name, mime_type, contents))
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_from_path_guesses_mime_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::File::create(&path).unwrap().write_all(b"\x89PNG").unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(file.file_name, "scan.png");
        assert_eq!(file.mime_type, "image/png");
        assert_eq!(file.len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_extension_is_octet_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("impression.stlx");
        std::fs::write(&path, b"").unwrap();

        let file = UploadFile::from_path(&path).await.unwrap();
        assert_eq!(file.mime_type, "application/octet-stream");
        assert!(file.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = UploadFile::from_path("/definitely/not/here.pdf").await.unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_file_meta_decoding() {
        let meta: FileMeta = serde_json::from_str(
            r#"{"url":"https://cdn.example.com/cases/a.png","key":"cases/a.png","bucket":"clinic-files","originalName":"a.png","mimeType":"image/png","size":2048}"#,
        )
        .unwrap();
        assert_eq!(meta.key, "cases/a.png");
        assert_eq!(meta.size, 2048);
        assert!(meta.validate().is_ok());
    }
}
