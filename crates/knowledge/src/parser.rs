//! Text extraction from uploaded documents.
//!
//! PDFs are read page by page; a page that fails to decode is skipped
//! rather than failing the whole document. Plain text and Markdown uploads
//! are decoded as UTF-8.

use campus_core::{AppError, AppResult};
use std::path::Path;

/// Document kind, detected from the document name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
    Markdown,
    Unsupported,
}

impl DocumentKind {
    /// Detect document kind from the name's extension.
    pub fn from_name(name: &str) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => Self::Pdf,
            Some("txt") | Some("text") => Self::PlainText,
            Some("md") | Some("markdown") => Self::Markdown,
            _ => Self::Unsupported,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Text extraction capability.
pub trait TextExtractor: Send + Sync {
    /// Extract the text of one document. Errors are `AppError::Extraction`.
    fn extract(&self, name: &str, bytes: &[u8]) -> AppResult<String>;
}

/// Extractor that dispatches on the document kind.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentExtractor;

impl TextExtractor for DocumentExtractor {
    fn extract(&self, name: &str, bytes: &[u8]) -> AppResult<String> {
        match DocumentKind::from_name(name) {
            DocumentKind::Pdf => extract_pdf(name, bytes),
            DocumentKind::PlainText | DocumentKind::Markdown => extract_utf8(name, bytes),
            DocumentKind::Unsupported => Err(AppError::Extraction(format!(
                "{}: unsupported document type (expected .pdf, .txt or .md)",
                name
            ))),
        }
    }
}

/// Extract text from PDF bytes, one page at a time, in page order.
pub fn extract_pdf(name: &str, bytes: &[u8]) -> AppResult<String> {
    let document = lopdf::Document::load_mem(bytes)
        .map_err(|e| AppError::Extraction(format!("{}: failed to read PDF: {}", name, e)))?;

    let pages = document.get_pages();
    tracing::debug!("{}: {} pages", name, pages.len());

    let page_texts = pages.keys().map(|&page_number| {
        document
            .extract_text(&[page_number])
            .map_err(|e| format!("page {}: {}", page_number, e))
    });

    assemble_pages(name, page_texts)
}

/// Join page texts in order, skipping failed pages.
///
/// Fails when there are no pages at all or no page yields any text.
pub fn assemble_pages<I>(name: &str, pages: I) -> AppResult<String>
where
    I: IntoIterator<Item = Result<String, String>>,
{
    let mut page_count = 0usize;
    let mut text = String::new();

    for page in pages {
        page_count += 1;
        match page {
            Ok(page_text) => {
                if page_text.trim().is_empty() {
                    continue;
                }
                if !text.is_empty() && !text.ends_with('\n') {
                    text.push('\n');
                }
                text.push_str(&page_text);
            }
            Err(e) => tracing::debug!("{}: skipping unreadable {}", name, e),
        }
    }

    if page_count == 0 {
        return Err(AppError::Extraction(format!("{}: document has no pages", name)));
    }

    if text.trim().is_empty() {
        return Err(AppError::Extraction(format!(
            "{}: no text could be extracted from {} page(s)",
            name, page_count
        )));
    }

    Ok(text)
}

/// Decode a plain text upload.
pub fn extract_utf8(name: &str, bytes: &[u8]) -> AppResult<String> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| AppError::Extraction(format!("{}: not valid UTF-8: {}", name, e)))?;

    let text = text.trim_start_matches('\u{feff}');
    if text.trim().is_empty() {
        return Err(AppError::Extraction(format!("{}: document is empty", name)));
    }

    Ok(text.to_string())
}
