//! PayPal transaction overview (PDF).

use super::patterns::PAYPAL_PDF_ROW;
use super::{ExtractorContext, Institute, TransactionExtractor, close_block};
use crate::error::Result;
use crate::locale::{parse_amount, parse_date};
use crate::log::RunLog;
use crate::models::{Transaction, TransactionBuilder};
use crate::pdf::StatementText;

const HEADER_MARKER: &str = "Transaktionscode";
const MIN_TOKENS: usize = 6;
const CODE_TOKEN: usize = 4;

/// Reads the tabular overview: one booking per line, whitespace separated,
/// `date description... code ... amount [currency]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayPalPdfExtractor {
    pub(crate) context: ExtractorContext,
}

impl PayPalPdfExtractor {
    pub fn new(context: ExtractorContext) -> Self {
        Self { context }
    }

    pub fn parse(&self, text: &StatementText, log: &RunLog) -> Vec<Transaction> {
        let source = self.context.source();
        if self.context.owner.is_none() {
            log.warning(format_args!(
                "{}: no PayPal owner configured; rows cannot be attributed",
                source
            ));
        }

        let mut lines = text.lines().map(str::trim);
        if !lines.any(|line| line.contains(HEADER_MARKER)) {
            log.warning(format_args!("{}: no '{}' header", source, HEADER_MARKER));
            return Vec::new();
        }

        let mut transactions = Vec::new();
        for line in lines.filter(|l| PAYPAL_PDF_ROW.is_match(l)) {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() < MIN_TOKENS {
                log.debug(format_args!("{}: skipping short row '{}'", source, line));
                continue;
            }

            let mut builder = self.context.new_transaction(Institute::PayPal, None);
            self.read_row(&mut builder, &tokens, &source, log);
            close_block(&builder, &source, log, &mut transactions);
        }

        transactions
    }

    fn read_row(&self, builder: &mut TransactionBuilder, tokens: &[&str], source: &str, log: &RunLog) {
        match parse_date(tokens[0]) {
            Ok(date) => {
                builder.date(date);
            }
            Err(e) => log.warning(format_args!("{}: {}", source, e)),
        }

        // A trailing currency code moves the amount one token left
        let (amount, currency) = match tokens[tokens.len() - 1] {
            last if is_currency_code(last) => (tokens[tokens.len() - 2], last),
            last => (last, "EUR"),
        };
        match parse_amount(amount) {
            Ok(value) => {
                builder.value(value);
            }
            Err(e) => log.warning(format_args!("{}: {}", source, e)),
        }

        let description = tokens[1..CODE_TOKEN].join(" ");
        builder
            .id(tokens[CODE_TOKEN])
            .currency(currency)
            .description(&description)
            .partner_name(description.as_str())
            .partner_institute(Institute::PayPal.name());
    }
}

impl TransactionExtractor for PayPalPdfExtractor {
    fn institute(&self) -> Institute {
        Institute::PayPal
    }

    fn extract_transactions(&self, log: &RunLog) -> Result<Vec<Transaction>> {
        let text = self.context.read_pdf()?;
        Ok(self.parse(&text, log))
    }
}

fn is_currency_code(token: &str) -> bool {
    token.len() == 3 && token.chars().all(|c| c.is_ascii_uppercase())
}
