//! PDF input handling
//!
//! - [`fetch`] - download a PDF from a URL into the work directory
//! - [`upload`] - persist uploaded bytes and normalize their temporary names
//! - text extraction (this module) - per-page text via `lopdf`

pub mod fetch;
pub mod upload;

use lopdf::Document;
use std::path::Path;

use crate::rag::chunker::normalize_text;
use crate::types::{AppError, Result};

/// Page texts of one PDF, normalized and in page order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDocument {
    pub pages: Vec<String>,
    /// Page number of `pages[0]`
    pub first_page: u32,
    /// Total pages in the file, including any outside the extracted range
    pub total_pages: usize,
}

impl PolicyDocument {
    pub fn word_count(&self) -> usize {
        self.pages
            .iter()
            .map(|p| p.split_whitespace().count())
            .sum()
    }
}

/// Extract pages `start_page..=end_page` (1-based, `end_page` defaults to the last page).
pub fn extract_pages(path: &Path, start_page: u32, end_page: Option<u32>) -> Result<PolicyDocument> {
    let doc = Document::load(path)
        .map_err(|e| AppError::Pdf(format!("Failed to load {}: {}", path.display(), e)))?;

    extract_from_document(&doc, start_page, end_page)
}

/// Same as [`extract_pages`] for an in-memory PDF.
pub fn extract_pages_from_bytes(
    bytes: &[u8],
    start_page: u32,
    end_page: Option<u32>,
) -> Result<PolicyDocument> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| AppError::Pdf(format!("Failed to load PDF: {}", e)))?;

    extract_from_document(&doc, start_page, end_page)
}

fn extract_from_document(
    doc: &Document,
    start_page: u32,
    end_page: Option<u32>,
) -> Result<PolicyDocument> {
    let start_page = start_page.max(1);
    let pages = doc.get_pages();
    let total_pages = pages.len();
    let end_page = end_page.unwrap_or(total_pages as u32);

    let mut texts = Vec::new();
    // get_pages is keyed by 1-based page number in document order
    for page_no in pages.keys().copied() {
        if page_no < start_page || page_no > end_page {
            continue;
        }
        let text = doc
            .extract_text(&[page_no])
            .map_err(|e| AppError::Pdf(format!("Failed to read page {}: {}", page_no, e)))?;
        texts.push(normalize_text(&text));
    }

    tracing::debug!(
        total_pages,
        extracted = texts.len(),
        start_page,
        "Extracted PDF text"
    );

    Ok(PolicyDocument {
        pages: texts,
        first_page: start_page,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_are_a_pdf_error() {
        let result = extract_pages_from_bytes(b"definitely not a pdf", 1, None);
        assert!(matches!(result, Err(AppError::Pdf(_))));
    }

    #[test]
    fn test_missing_file_is_a_pdf_error() {
        let result = extract_pages(Path::new("/nonexistent/policy.pdf"), 1, None);
        assert!(matches!(result, Err(AppError::Pdf(_))));
    }

    #[test]
    fn test_word_count() {
        let doc = PolicyDocument {
            pages: vec!["a b".to_string(), "".to_string(), "c".to_string()],
            first_page: 1,
            total_pages: 3,
        };
        assert_eq!(doc.word_count(), 3);
    }
}
