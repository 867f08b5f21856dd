//! Document text extraction: uploaded bytes + file name + MIME → plain text.
//!
//! Lets text-only providers work with uploaded files. PDFs go through
//! `pdf-extract` on the blocking pool; everything else must decode as text.

use thiserror::Error;
use tracing::warn;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_OCTET_STREAM: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to extract text from PDF file: {0}")]
    Pdf(String),

    #[error("Unsupported binary format: {0}")]
    UnsupportedBinary(String),

    #[error("Text extraction task failed: {0}")]
    Task(String),
}

/// Guesses a MIME type from the file extension.
pub fn guess_mime_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => MIME_PDF,
        "txt" => MIME_TEXT,
        "doc" => MIME_DOC,
        "docx" => MIME_DOCX,
        _ => MIME_OCTET_STREAM,
    }
}

/// Declared content type when present, otherwise a guess from the name.
pub fn resolve_mime_type(declared: Option<&str>, file_name: &str) -> String {
    declared
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| guess_mime_type(file_name).to_string())
}

pub fn is_pdf(mime_type: &str, file_name: &str) -> bool {
    mime_type == MIME_PDF || file_name.to_ascii_lowercase().ends_with(".pdf")
}

pub fn is_plain_text(mime_type: &str, file_name: &str) -> bool {
    mime_type == MIME_TEXT || file_name.to_ascii_lowercase().ends_with(".txt")
}

/// Extracts plain text from an uploaded document.
pub async fn extract_text(
    bytes: Vec<u8>,
    file_name: &str,
    mime_type: &str,
) -> Result<String, DocumentError> {
    if is_pdf(mime_type, file_name) {
        return extract_pdf(bytes).await;
    }

    if is_plain_text(mime_type, file_name) {
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }

    let text = String::from_utf8_lossy(&bytes);
    if text.contains('\u{0}') {
        warn!("Rejecting binary upload {file_name} ({mime_type})");
        return Err(DocumentError::UnsupportedBinary(file_name.to_string()));
    }
    Ok(text.into_owned())
}

async fn extract_pdf(bytes: Vec<u8>) -> Result<String, DocumentError> {
    // CPU-bound parse: keep it off the async executor.
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| DocumentError::Task(e.to_string()))?
        .map_err(|e| DocumentError::Pdf(e.to_string()))?;

    // pdf-extract separates pages with form feeds.
    let pages: Vec<&str> = text
        .split('\x0c')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect();
    Ok(pages.join("\n\n"))
}
