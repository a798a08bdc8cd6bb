//! Document text extraction.
//!
//! Pure Rust PDF text extraction via pdf-extract. Only the first page is
//! read; it carries the sender, date and subject. A scanned PDF without a
//! text layer yields `None`; callers continue with empty text.

use std::path::Path;

/// Maximum text length to keep (to avoid memory issues with huge docs)
const MAX_TEXT_LENGTH: usize = 500_000;

/// Produces the text of a document, or `None` when nothing is recoverable
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Option<String>;
}

/// Text extractor for PDF files
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Text of the first page, via pdf-extract
    /// Wrapped in catch_unwind to handle panics from malformed PDFs
    fn extract_pdf(&self, path: &Path) -> Result<String, String> {
        let bytes = std::fs::read(path).map_err(|e| format!("Failed to read PDF file: {}", e))?;

        tracing::debug!("[Extract] PDF file size: {} bytes", bytes.len());

        // The pdf_extract crate can panic on certain fonts/glyphs
        let pages = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })) {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => return Err(format!("PDF extraction failed: {}", e)),
            Err(_panic) => {
                return Err("PDF extraction panicked - likely contains malformed fonts".to_string())
            }
        };

        tracing::debug!("[Extract] {} pages, keeping the first", pages.len());
        let first_page = pages.into_iter().next().unwrap_or_default();

        Ok(truncate_text(&clean_text(&first_page), MAX_TEXT_LENGTH))
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Option<String> {
        match self.extract_pdf(path) {
            Ok(text) if text.is_empty() => {
                tracing::warn!(
                    "[Extract] No text layer in {} - likely scanned without OCR",
                    path.display()
                );
                None
            }
            Ok(text) => {
                tracing::info!(
                    "[Extract] {} chars, {} words from {}",
                    text.len(),
                    text.split_whitespace().count(),
                    path.display()
                );
                Some(text)
            }
            Err(e) => {
                tracing::warn!("[Extract] {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Trim every line and drop blank ones
pub fn clean_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Cut `text` to at most `max_bytes`, on a char boundary
pub fn truncate_text(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }

    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}
