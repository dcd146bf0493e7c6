//! Core library for bank statement extraction.
//!
//! This crate provides:
//! - German locale parsing (amounts, dates, IBANs)
//! - PDF text extraction
//! - Per-institution extractors for CSV exports and PDF statements
//! - Load, date filter and balance reconciliation stages

pub mod error;
pub mod extractor;
pub mod locale;
pub mod log;
pub mod models;
pub mod pdf;
pub mod processor;

pub use error::{ExtractionError, LedgerError, ParseError, PdfError, Result};
pub use extractor::{Extractor, Institute, TransactionExtractor, create_extractor};
pub use log::RunLog;
pub use models::{
    Account, Configuration, ConfigFile, DateWindow, Invoice, OwnerAccount, SortField, Transaction,
    TransactionBuilder, TransactionCollection,
};
pub use processor::{RunOutput, ValidationReport};
