//! Per-institution statement extractors.
//!
//! Every supported statement layout is one variant of [`Extractor`]. All
//! variants share the same booking-block scheme: recognize a booking line,
//! collect continuation lines into a [`TransactionBuilder`], and close the
//! block at the next booking line, a terminator, or the end of input. A block
//! that does not build into a valid transaction is dropped with a warning.

pub mod barclays;
pub mod consorsbank;
pub mod dkb_csv;
pub mod factory;
pub mod ing;
pub mod patterns;
pub mod paypal_csv;
pub mod paypal_pdf;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::log::RunLog;
use crate::models::{OwnerConfig, Transaction, TransactionBuilder};
use crate::pdf::{PdfExtractor, StatementText};

pub use barclays::BarclaysExtractor;
pub use consorsbank::ConsorsbankExtractor;
pub use dkb_csv::DkbCsvExtractor;
pub use factory::create_extractor;
pub use ing::IngExtractor;
pub use paypal_csv::PayPalCsvExtractor;
pub use paypal_pdf::PayPalPdfExtractor;

/// Institutions with a supported statement layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Institute {
    Dkb,
    PayPal,
    Ing,
    Barclays,
    Consorsbank,
}

impl Institute {
    /// Name used as `owner.institute` and as configuration key.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Dkb => "DKB",
            Self::PayPal => "PayPal",
            Self::Ing => "ING",
            Self::Barclays => "Barclays",
            Self::Consorsbank => "Consorsbank",
        }
    }
}

impl fmt::Display for Institute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Capability shared by all extractors.
pub trait TransactionExtractor {
    /// Institution whose layout this extractor reads.
    fn institute(&self) -> Institute;

    /// Read the source document and return its valid transactions.
    ///
    /// Field-level problems drop single rows with a warning. An error is
    /// returned only when the document itself cannot be read.
    fn extract_transactions(&self, log: &RunLog) -> Result<Vec<Transaction>>;
}

/// Source document and the owner fallback configured for its institute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorContext {
    pub path: PathBuf,
    pub owner: Option<OwnerConfig>,
}

impl ExtractorContext {
    pub fn new(path: impl Into<PathBuf>, owner: Option<OwnerConfig>) -> Self {
        Self {
            path: path.into(),
            owner,
        }
    }

    /// Source string recorded on every transaction.
    pub fn source(&self) -> String {
        self.path.display().to_string()
    }

    /// Start a transaction carrying the source and owner defaults.
    ///
    /// `iban` is the account number found in the document; the configured
    /// owner id is used only when the document has none.
    pub(crate) fn new_transaction(
        &self,
        institute: Institute,
        iban: Option<&str>,
    ) -> TransactionBuilder {
        let mut builder = TransactionBuilder::new();
        builder.source(self.source()).owner_institute(institute.name());

        let configured = self.owner.as_ref();
        if let Some(id) = iban.or(configured.and_then(|o| o.id.as_deref())) {
            builder.owner_id(id);
        }
        if let Some(name) = configured.and_then(|o| o.name.as_deref()) {
            builder.owner_name(name);
        }
        builder
    }

    pub(crate) fn read_text(&self) -> Result<String> {
        let bytes = std::fs::read(&self.path)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }

    pub(crate) fn read_pdf(&self) -> Result<StatementText> {
        Ok(PdfExtractor::open(&self.path)?.statement_text()?)
    }
}

/// Closed set of supported statement layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extractor {
    DkbCsv(DkbCsvExtractor),
    PayPalCsv(PayPalCsvExtractor),
    Ing(IngExtractor),
    Barclays(BarclaysExtractor),
    Consorsbank(ConsorsbankExtractor),
    PayPalPdf(PayPalPdfExtractor),
}

impl Extractor {
    /// Short layout name for log messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DkbCsv(_) => "DKB CSV",
            Self::PayPalCsv(_) => "PayPal CSV",
            Self::Ing(_) => "ING PDF",
            Self::Barclays(_) => "Barclays PDF",
            Self::Consorsbank(_) => "Consorsbank PDF",
            Self::PayPalPdf(_) => "PayPal PDF",
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::DkbCsv(e) => &e.context.path,
            Self::PayPalCsv(e) => &e.context.path,
            Self::Ing(e) => &e.context.path,
            Self::Barclays(e) => &e.context.path,
            Self::Consorsbank(e) => &e.context.path,
            Self::PayPalPdf(e) => &e.context.path,
        }
    }
}

impl TransactionExtractor for Extractor {
    fn institute(&self) -> Institute {
        match self {
            Self::DkbCsv(e) => e.institute(),
            Self::PayPalCsv(e) => e.institute(),
            Self::Ing(e) => e.institute(),
            Self::Barclays(e) => e.institute(),
            Self::Consorsbank(e) => e.institute(),
            Self::PayPalPdf(e) => e.institute(),
        }
    }

    fn extract_transactions(&self, log: &RunLog) -> Result<Vec<Transaction>> {
        match self {
            Self::DkbCsv(e) => e.extract_transactions(log),
            Self::PayPalCsv(e) => e.extract_transactions(log),
            Self::Ing(e) => e.extract_transactions(log),
            Self::Barclays(e) => e.extract_transactions(log),
            Self::Consorsbank(e) => e.extract_transactions(log),
            Self::PayPalPdf(e) => e.extract_transactions(log),
        }
    }
}

/// Close a booking block: keep the transaction if it builds, otherwise warn.
pub(crate) fn close_block(
    builder: &TransactionBuilder,
    source: &str,
    log: &RunLog,
    transactions: &mut Vec<Transaction>,
) {
    match builder.build() {
        Ok(transaction) => {
            log.debug(format_args!(
                "{}: {} {} {}",
                source,
                transaction.date(),
                transaction.value(),
                transaction.currency()
            ));
            transactions.push(transaction);
        }
        Err(e) => log.warning(format_args!("{}: dropping booking: {}", source, e)),
    }
}

/// Warn when a document's owner account number could not be found.
pub(crate) fn warn_missing_iban(iban: Option<&str>, source: &str, log: &RunLog) {
    if iban.is_none() {
        log.warning(format_args!("{}: no IBAN found in document", source));
    }
}

/// Map trimmed header names to column positions.
pub(crate) fn index_columns(header: &csv::StringRecord) -> HashMap<String, usize> {
    header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().to_string(), i))
        .collect()
}

/// A CSV record with access by column name.
pub(crate) struct CsvRow<'a> {
    columns: &'a HashMap<String, usize>,
    record: &'a csv::StringRecord,
}

impl<'a> CsvRow<'a> {
    pub(crate) fn new(columns: &'a HashMap<String, usize>, record: &'a csv::StringRecord) -> Self {
        Self { columns, record }
    }

    /// Trimmed cell of the named column; empty if the column is absent.
    pub(crate) fn get(&self, column: &str) -> &'a str {
        self.columns
            .get(column)
            .and_then(|&i| self.record.get(i))
            .map(str::trim)
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn context(name: &str) -> ExtractorContext {
        ExtractorContext::new(name, None)
    }

    pub fn context_with_owner(name: &str, id: &str, owner_name: &str) -> ExtractorContext {
        ExtractorContext::new(
            name,
            Some(OwnerConfig {
                id: Some(id.to_string()),
                name: Some(owner_name.to_string()),
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::*;

    #[test]
    fn test_institute_names() {
        assert_eq!(Institute::Dkb.to_string(), "DKB");
        assert_eq!(Institute::PayPal.name(), "PayPal");
    }

    #[test]
    fn test_new_transaction_prefers_document_iban() {
        let ctx = context_with_owner("a.pdf", "DE12500105170648489890", "Max Mustermann");
        let mut builder = ctx.new_transaction(Institute::Ing, Some("DE89370400440532013000"));
        builder
            .date(chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap())
            .value(rust_decimal::Decimal::ONE)
            .currency("EUR")
            .partner_name("Shop");
        let transaction = builder.build().unwrap();
        assert_eq!(transaction.owner().id(), Some("DE89370400440532013000"));
        assert_eq!(transaction.owner().name(), Some("Max Mustermann"));
        assert_eq!(transaction.owner().institute(), Some("ING"));
        assert_eq!(transaction.source(), "a.pdf");

        let mut builder = ctx.new_transaction(Institute::Ing, None);
        builder
            .date(chrono::NaiveDate::from_ymd_opt(2023, 1, 2).unwrap())
            .value(rust_decimal::Decimal::ONE)
            .currency("EUR")
            .partner_name("Shop");
        assert_eq!(
            builder.build().unwrap().owner().id(),
            Some("DE12500105170648489890")
        );
    }

    #[test]
    fn test_close_block_drops_invalid() {
        let log = RunLog::new();
        let mut out = Vec::new();
        let builder = context("x.csv").new_transaction(Institute::Dkb, None);
        close_block(&builder, "x.csv", &log, &mut out);
        assert!(out.is_empty());
        assert_eq!(log.warning_count(), 1);
    }
}
