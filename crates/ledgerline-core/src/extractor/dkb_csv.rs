//! DKB account export (`;`-separated CSV with a preamble).

use csv::ReaderBuilder;

use super::{
    CsvRow, ExtractorContext, Institute, TransactionExtractor, close_block, index_columns,
    warn_missing_iban,
};
use crate::error::Result;
use crate::locale::{IbanExtractor, parse_amount, parse_date};
use crate::log::RunLog;
use crate::models::Transaction;

const HEADER_MARKER: &str = "Buchungsdatum";
const AMOUNT_COLUMNS: [&str; 2] = ["Betrag (€)", "Betrag (EUR)"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DkbCsvExtractor {
    pub(crate) context: ExtractorContext,
}

impl DkbCsvExtractor {
    pub fn new(context: ExtractorContext) -> Self {
        Self { context }
    }

    /// Parse the text of a DKB export.
    pub fn parse(&self, content: &str, log: &RunLog) -> Vec<Transaction> {
        let source = self.context.source();
        let mut reader = ReaderBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut records = Vec::new();
        for (line, record) in reader.records().enumerate() {
            match record {
                Ok(record) => records.push((line + 1, record)),
                Err(e) => log.warning(format_args!("{}: unreadable row {}: {}", source, line + 1, e)),
            }
        }

        let Some(header) = records
            .iter()
            .position(|(_, r)| r.get(0).map(str::trim) == Some(HEADER_MARKER))
        else {
            log.warning(format_args!("{}: no '{}' header row found", source, HEADER_MARKER));
            return Vec::new();
        };

        let preamble = records[..header]
            .iter()
            .map(|(_, r)| r.iter().collect::<Vec<_>>().join(";"))
            .collect::<Vec<_>>()
            .join("\n");
        let iban = IbanExtractor::grouped().extract(&preamble);
        warn_missing_iban(iban.as_deref(), &source, log);

        let columns = index_columns(&records[header].1);
        let mut transactions = Vec::new();

        for (line, record) in &records[header + 1..] {
            let line = *line;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let row = CsvRow::new(&columns, record);
            let mut builder = self.context.new_transaction(Institute::Dkb, iban.as_deref());
            builder.currency("EUR");

            match parse_date(row.get("Buchungsdatum")) {
                Ok(date) => {
                    builder.date(date);
                }
                Err(e) => log.warning(format_args!("{}: row {}: {}", source, line, e)),
            }
            if let Ok(valuta) = parse_date(row.get("Wertstellung")) {
                builder.valuta_date(valuta);
            }

            let amount = AMOUNT_COLUMNS
                .iter()
                .map(|name| row.get(name))
                .find(|value| !value.is_empty())
                .unwrap_or_default();
            match parse_amount(amount) {
                Ok(value) => {
                    builder.value(value);
                }
                Err(e) => log.warning(format_args!("{}: row {}: {}", source, line, e)),
            }

            let payer = row.get("Zahlungspflichtige*r");
            let payee = row.get("Zahlungsempfänger*in");
            let (own_name, partner_name) = match builder.current_value() {
                Some(value) if value.is_sign_positive() && !value.is_zero() => (payee, payer),
                _ => (payer, payee),
            };
            if !own_name.is_empty() {
                builder.owner_name(own_name);
            }
            builder
                .partner_name(partner_name)
                .partner_id(row.get("IBAN"))
                .description(row.get("Verwendungszweck"))
                .kind(row.get("Umsatztyp"))
                .creditor_id(row.get("Gläubiger-ID"))
                .mandate_reference(row.get("Mandatsreferenz"))
                .customer_reference(row.get("Kundenreferenz"));

            close_block(&builder, &source, log, &mut transactions);
        }

        transactions
    }
}

impl TransactionExtractor for DkbCsvExtractor {
    fn institute(&self) -> Institute {
        Institute::Dkb
    }

    fn extract_transactions(&self, log: &RunLog) -> Result<Vec<Transaction>> {
        let content = self.context.read_text()?;
        Ok(self.parse(&content, log))
    }
}
