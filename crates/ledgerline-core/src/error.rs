//! Error types for the ledgerline-core library.

use thiserror::Error;

/// Main error type for the ledgerline library.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Field-level parse error.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Transaction assembly error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Field-level parse errors. Callers recover from these locally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Malformed amount text.
    #[error("invalid amount '{value}'")]
    Amount { value: String },

    /// Malformed date text.
    #[error("invalid date '{value}'")]
    Date { value: String },

    /// A `DD.MM.` fragment without a year to complete it.
    #[error("no year available to complete date '{value}'")]
    MissingYear { value: String },

    /// Malformed time or timezone text.
    #[error("invalid time '{value}'")]
    Time { value: String },
}

/// Errors raised when a partially assembled transaction cannot be finalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Required field is missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Owner or partner account does not satisfy its validity rule.
    #[error("invalid {role} account")]
    InvalidAccount { role: &'static str },

    /// An invoice reference is set but blank.
    #[error("invalid invoice reference")]
    InvalidInvoice,
}

/// Result type for the ledgerline library.
pub type Result<T> = std::result::Result<T, LedgerError>;
