use log::{debug, error, info, warn};
use lopdf::Document;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::ExtractionError;
use crate::generation::UploadedDocument;

// @module: PDF text extraction and cleanup

/// Pages processed per document; later pages are ignored
pub const MAX_PAGES: usize = 100;

/// Characters assumed per printed page when estimating page count
pub const CHARS_PER_PAGE: usize = 2000;

/// Minimum amount of text an upload must yield to be usable
pub const MIN_TEXT_CHARS: usize = 50;

// @const: Runs of spaces
static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());

/// Whether a file name designates a PDF upload
pub fn is_pdf_filename(file_name: &str) -> bool {
    file_name.ends_with(".pdf") || file_name.ends_with(".PDF")
}

/// Normalize extracted text
///
/// Trims every line, drops empty lines and collapses runs of spaces.
/// Applying it twice gives the same result as applying it once.
pub fn clean_text(text: &str) -> String {
    let joined = text
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    SPACE_RUNS.replace_all(&joined, " ").into_owned()
}

/// Rough page count from text length, never below one
pub fn estimate_page_count(text: &str) -> usize {
    (text.chars().count() / CHARS_PER_PAGE).max(1)
}

// @struct: PDF text extractor
#[derive(Debug, Clone, Copy)]
pub struct PdfProcessor {
    max_pages: usize,
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self { max_pages: MAX_PAGES }
    }
}

impl PdfProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Processor with a custom page cap
    pub fn with_max_pages(max_pages: usize) -> Self {
        Self { max_pages }
    }

    /// Extract cleaned text from a PDF held in memory
    ///
    /// Pages past the cap are skipped. A page that fails to extract is
    /// logged and skipped; the call only fails when no page yields text.
    pub fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        info!(
            "Starting PDF extraction, file size: {:.2} MB",
            bytes.len() as f64 / 1024.0 / 1024.0
        );

        let document = Document::load_mem(bytes).map_err(|e| {
            error!("Error reading PDF: {}", e);
            ExtractionError::Malformed(e.to_string())
        })?;

        let pages = document.get_pages();
        let total_pages = pages.len();
        info!("PDF has {} pages", total_pages);
        if total_pages > self.max_pages {
            warn!(
                "PDF has {} pages, only processing first {}",
                total_pages, self.max_pages
            );
        }

        let mut page_texts = Vec::new();
        for &page_number in pages.keys().take(self.max_pages) {
            match document.extract_text(&[page_number]) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!("Extracted {} chars from page {}", text.chars().count(), page_number);
                    page_texts.push(text);
                }
                Ok(_) => debug!("Page {} has no text", page_number),
                Err(e) => warn!("Error extracting text from page {}: {}", page_number, e),
            }
        }

        if page_texts.is_empty() {
            error!("No page yielded text");
            return Err(ExtractionError::NoText);
        }

        let text = clean_text(&page_texts.join("\n\n"));
        info!(
            "Extracted {} characters from {} pages",
            text.chars().count(),
            page_texts.len()
        );
        Ok(text)
    }

    /// Extract an upload into a document, enforcing the minimum text amount
    pub fn process(&self, file_name: &str, bytes: &[u8]) -> Result<UploadedDocument, ExtractionError> {
        let content = self.extract_text(bytes)?;

        let chars = content.trim().chars().count();
        if chars < MIN_TEXT_CHARS {
            return Err(ExtractionError::InsufficientText { chars });
        }

        let page_count = estimate_page_count(&content);
        Ok(UploadedDocument {
            file_name: file_name.to_string(),
            content,
            page_count,
        })
    }
}
