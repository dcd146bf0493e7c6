//! PDF text extraction for statement documents.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text of a statement document, per page and as a whole.
///
/// Extractors work on this instead of the PDF itself so they can be fed
/// plain text in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatementText {
    /// Text of each page, in page order.
    pub pages: Vec<String>,
    /// Text of the whole document; layout may differ from the joined pages.
    pub full_text: String,
}

impl StatementText {
    /// Build from page texts; the full text is the pages joined by blank lines.
    pub fn from_pages(pages: Vec<String>) -> Self {
        let full_text = pages.join("\n\n");
        Self { pages, full_text }
    }

    /// Lines of every page, in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|page| page.lines())
    }
}

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}
