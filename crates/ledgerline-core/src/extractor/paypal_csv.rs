//! PayPal activity export (`,`-separated CSV, German column names).

use csv::ReaderBuilder;

use super::{CsvRow, ExtractorContext, Institute, TransactionExtractor, close_block, index_columns};
use crate::error::Result;
use crate::locale::{combine_date_time, parse_amount, parse_date};
use crate::log::RunLog;
use crate::models::Transaction;

const DEFAULT_PARTNER_INSTITUTE: &str = "PayPal";

/// PayPal rows never name the holder's own account, so the owner comes from
/// the configured `institutes.paypal.owner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayPalCsvExtractor {
    pub(crate) context: ExtractorContext,
}

impl PayPalCsvExtractor {
    pub fn new(context: ExtractorContext) -> Self {
        Self { context }
    }

    pub fn parse(&self, content: &str, log: &RunLog) -> Vec<Transaction> {
        let source = self.context.source();
        if self.context.owner.is_none() {
            log.warning(format_args!(
                "{}: no PayPal owner configured; rows cannot be attributed",
                source
            ));
        }

        let content = content.trim_start_matches('\u{feff}');
        let mut reader = ReaderBuilder::new()
            .delimiter(b',')
            .flexible(true)
            .from_reader(content.as_bytes());

        let columns = match reader.headers() {
            Ok(headers) => index_columns(headers),
            Err(e) => {
                log.warning(format_args!("{}: unreadable header: {}", source, e));
                return Vec::new();
            }
        };
        if !columns.contains_key("Transaktionscode") {
            log.warning(format_args!("{}: no 'Transaktionscode' column", source));
            return Vec::new();
        }

        let mut transactions = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let line = index + 2;
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    log.warning(format_args!("{}: unreadable row {}: {}", source, line, e));
                    continue;
                }
            };
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let row = CsvRow::new(&columns, &record);
            let mut builder = self.context.new_transaction(Institute::PayPal, None);

            match parse_date(row.get("Datum")) {
                Ok(date) => match combine_date_time(date, row.get("Uhrzeit"), row.get("Zeitzone")) {
                    Ok(datetime) => {
                        builder.date(datetime);
                    }
                    Err(e) => {
                        log.debug(format_args!("{}: row {}: {}; keeping date only", source, line, e));
                        builder.date(date);
                    }
                },
                Err(e) => log.warning(format_args!("{}: row {}: {}", source, line, e)),
            }

            match parse_amount(row.get("Netto")) {
                Ok(value) => {
                    builder.value(value);
                }
                Err(e) => log.warning(format_args!("{}: row {}: {}", source, line, e)),
            }

            let incoming = builder
                .current_value()
                .is_some_and(|v| v.is_sign_positive() && !v.is_zero());
            let partner_id = if incoming {
                row.get("Absender E-Mail-Adresse")
            } else {
                row.get("Empfänger E-Mail-Adresse")
            };
            let partner_institute = Some(row.get("Name der Bank"))
                .filter(|name| !name.is_empty())
                .unwrap_or(DEFAULT_PARTNER_INSTITUTE);

            builder
                .id(row.get("Transaktionscode"))
                .related_transaction_id(row.get("Zugehöriger Transaktionscode"))
                .currency(row.get("Währung"))
                .description(row.get("Beschreibung"))
                .kind(row.get("Typ"))
                .partner_id(partner_id)
                .partner_name(row.get("Name"))
                .partner_institute(partner_institute)
                .invoice_id(row.get("Rechnungsnummer"));

            close_block(&builder, &source, log, &mut transactions);
        }

        transactions
    }
}

impl TransactionExtractor for PayPalCsvExtractor {
    fn institute(&self) -> Institute {
        Institute::PayPal
    }

    fn extract_transactions(&self, log: &RunLog) -> Result<Vec<Transaction>> {
        let content = self.context.read_text()?;
        Ok(self.parse(&content, log))
    }
}
