//! Document extraction. Flattens an uploaded skill sheet into plain text.
//!
//! The declared MIME type is parsed into a closed `DocumentKind`; every kind
//! maps to exactly one extraction strategy. Structure (tables, layout, page
//! breaks) is not preserved.
//!
//! Extraction is CPU-bound and runs inside `tokio::task::spawn_blocking`.

pub mod docx;
pub mod pdf;
pub mod spreadsheet;

use std::fmt;

use bytes::Bytes;
use thiserror::Error;
use tracing::info;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_XLS: &str = "application/vnd.ms-excel";
pub const MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported content type '{0}'")]
    UnsupportedFormat(String),

    #[error("malformed {kind} document: {reason}")]
    Malformed { kind: DocumentKind, reason: String },

    #[error("extraction task failed: {0}")]
    Task(String),
}

/// The document formats a skill sheet may be uploaded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    LegacySpreadsheet,
    ModernSpreadsheet,
    WordDocument,
}

impl DocumentKind {
    /// Maps a declared content type to a kind. Parameters (`; charset=...`)
    /// and letter case are ignored.
    pub fn from_mime(content_type: &str) -> Result<Self, ExtractError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            MIME_PDF => Ok(DocumentKind::Pdf),
            MIME_XLS => Ok(DocumentKind::LegacySpreadsheet),
            MIME_XLSX => Ok(DocumentKind::ModernSpreadsheet),
            MIME_DOCX => Ok(DocumentKind::WordDocument),
            _ => Err(ExtractError::UnsupportedFormat(content_type.to_string())),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentKind::Pdf => "PDF",
            DocumentKind::LegacySpreadsheet => "XLS",
            DocumentKind::ModernSpreadsheet => "XLSX",
            DocumentKind::WordDocument => "DOCX",
        };
        f.write_str(name)
    }
}

/// An uploaded file, consumed once by extraction.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub content_type: String,
    pub data: Bytes,
}

/// Synchronous extraction for an already-classified document.
pub fn extract_text(kind: DocumentKind, data: &[u8]) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => pdf::extract(data),
        DocumentKind::LegacySpreadsheet | DocumentKind::ModernSpreadsheet => {
            spreadsheet::extract(kind, data)
        }
        DocumentKind::WordDocument => docx::extract(data),
    }
}

/// Extracts the plain text of an upload off the async runtime.
pub async fn extract_document(
    kind: DocumentKind,
    document: UploadedDocument,
) -> Result<String, ExtractError> {
    let size = document.data.len();
    let text = tokio::task::spawn_blocking(move || extract_text(kind, &document.data))
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))??;

    info!(
        "Extracted {} chars from {} upload ({} bytes)",
        text.chars().count(),
        kind,
        size
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime_maps_all_supported_types() {
        assert_eq!(DocumentKind::from_mime(MIME_PDF).unwrap(), DocumentKind::Pdf);
        assert_eq!(
            DocumentKind::from_mime(MIME_XLS).unwrap(),
            DocumentKind::LegacySpreadsheet
        );
        assert_eq!(
            DocumentKind::from_mime(MIME_XLSX).unwrap(),
            DocumentKind::ModernSpreadsheet
        );
        assert_eq!(
            DocumentKind::from_mime(MIME_DOCX).unwrap(),
            DocumentKind::WordDocument
        );
    }

    #[test]
    fn test_from_mime_ignores_parameters_and_case() {
        let kind = DocumentKind::from_mime("Application/PDF; name=cv.pdf").unwrap();
        assert_eq!(kind, DocumentKind::Pdf);
    }

    #[test]
    fn test_from_mime_rejects_unknown_types() {
        for mime in ["text/plain", "image/png", "application/msword", ""] {
            let err = DocumentKind::from_mime(mime).unwrap_err();
            assert!(
                matches!(err, ExtractError::UnsupportedFormat(ref m) if m == mime),
                "expected UnsupportedFormat for {mime:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_extract_document_propagates_malformed_input() {
        let upload = UploadedDocument {
            file_name: Some("broken.docx".to_string()),
            content_type: MIME_DOCX.to_string(),
            data: Bytes::from_static(b"definitely not a zip archive"),
        };
        let err = extract_document(DocumentKind::WordDocument, upload)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractError::Malformed {
                kind: DocumentKind::WordDocument,
                ..
            }
        ));
    }
}
