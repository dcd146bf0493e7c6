//! Barclays credit-card statements (PDF).

use regex::Captures;

use super::patterns::{
    BARCLAYS_BOOKING_LINE, BARCLAYS_CREDITOR_ID, BARCLAYS_MANDATE, BARCLAYS_TERMINATOR,
};
use super::{ExtractorContext, Institute, TransactionExtractor, close_block, warn_missing_iban};
use crate::error::Result;
use crate::locale::{IbanExtractor, parse_amount, parse_date};
use crate::log::RunLog;
use crate::models::{Transaction, TransactionBuilder};
use crate::pdf::StatementText;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarclaysExtractor {
    pub(crate) context: ExtractorContext,
}

impl BarclaysExtractor {
    pub fn new(context: ExtractorContext) -> Self {
        Self { context }
    }

    pub fn parse(&self, text: &StatementText, log: &RunLog) -> Vec<Transaction> {
        let source = self.context.source();
        let iban = IbanExtractor::labeled_colon().extract(&text.full_text);
        warn_missing_iban(iban.as_deref(), &source, log);

        let mut transactions = Vec::new();
        for page in &text.pages {
            let mut open: Option<TransactionBuilder> = None;

            for line in page.lines().map(str::trim).filter(|l| !l.is_empty()) {
                if let Some(caps) = BARCLAYS_BOOKING_LINE.captures(line) {
                    if let Some(done) = open.take() {
                        close_block(&done, &source, log, &mut transactions);
                    }
                    let mut builder =
                        self.context.new_transaction(Institute::Barclays, iban.as_deref());
                    read_booking_line(&mut builder, &caps, &source, log);
                    open = Some(builder);
                } else if BARCLAYS_TERMINATOR.is_match(line) {
                    if let Some(done) = open.take() {
                        close_block(&done, &source, log, &mut transactions);
                    }
                } else if let Some(builder) = open.as_mut() {
                    read_continuation(builder, line);
                }
            }

            if let Some(done) = open.take() {
                close_block(&done, &source, log, &mut transactions);
            }
        }

        transactions
    }
}

impl TransactionExtractor for BarclaysExtractor {
    fn institute(&self) -> Institute {
        Institute::Barclays
    }

    fn extract_transactions(&self, log: &RunLog) -> Result<Vec<Transaction>> {
        let text = self.context.read_pdf()?;
        Ok(self.parse(&text, log))
    }
}

fn read_booking_line(builder: &mut TransactionBuilder, caps: &Captures, source: &str, log: &RunLog) {
    builder.currency("EUR");

    match parse_date(&caps[1]) {
        Ok(date) => {
            builder.date(date);
        }
        Err(e) => log.warning(format_args!("{}: {}", source, e)),
    }
    if let Ok(valuta) = parse_date(&caps[2]) {
        builder.valuta_date(valuta);
    }

    match parse_amount(&caps[5]) {
        Ok(value) => {
            builder.value(value);
            builder.kind(if value.is_sign_negative() { "Abbuchung" } else { "Gutschrift" });
        }
        Err(e) => log.warning(format_args!("{}: {}", source, e)),
    }

    if caps.get(4).is_some() {
        builder.medium("Visa");
    }
    builder.partner_name(caps[3].trim());
}

fn read_continuation(builder: &mut TransactionBuilder, line: &str) {
    if BARCLAYS_MANDATE.is_match(line) {
        builder.mandate_reference(line);
    } else if BARCLAYS_CREDITOR_ID.is_match(line) {
        builder.creditor_id(line);
    } else {
        builder.description(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::test_support::context;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    const PAGE: &str = "\
Barclaycard Visa
Barclays Bank Ireland PLC · BIC BARCDEHAXXX
IBAN: DE12 5001 0517 0648 4898 90
Belegdatum Buchungsdatum Beschreibung Betrag
Saldo letzte Abrechnung 120,00-
25.02.2022 28.02.2022 RST PRAIA REIS MAGOS CANICO PT Visa 17,00-
01.03.2022 01.03.2022 Lastschrift Ausgleich 120,00+
P000123456
DE98ZZZ09999999999
Ausgleich Kreditkarte
02.03.2022 03.03.2022 Streaming Dienst LU Visa 9,99-
Neuer Saldo 26,99-
Kontakt 040 890 990
";

    fn parse(log: &RunLog) -> Vec<Transaction> {
        let text = StatementText::from_pages(vec![PAGE.to_string()]);
        BarclaysExtractor::new(context("barclays.pdf")).parse(&text, log)
    }

    #[test]
    fn test_card_payment() {
        let log = RunLog::new();
        let transactions = parse(&log);
        assert_eq!(transactions.len(), 3);
        assert_eq!(log.warning_count(), 0);

        let card = &transactions[0];
        assert_eq!(card.date().date(), NaiveDate::from_ymd_opt(2022, 2, 25).unwrap());
        assert_eq!(card.valuta_date().date(), NaiveDate::from_ymd_opt(2022, 2, 28).unwrap());
        assert_eq!(card.value(), Decimal::new(-1700, 2));
        assert_eq!(card.kind(), Some("Abbuchung"));
        assert_eq!(card.medium(), Some("Visa"));
        assert_eq!(card.partner().name.as_deref(), Some("RST PRAIA REIS MAGOS CANICO"));
        assert_eq!(card.owner().id(), Some("DE12500105170648489890"));
        assert_eq!(card.owner().institute(), Some("Barclays"));
    }

    #[test]
    fn test_direct_debit_with_sepa_references() {
        let transactions = parse(&RunLog::new());

        let settlement = &transactions[1];
        assert_eq!(settlement.value(), Decimal::new(12000, 2));
        assert_eq!(settlement.kind(), Some("Gutschrift"));
        assert_eq!(settlement.medium(), None);
        assert_eq!(settlement.invoice().mandate_reference.as_deref(), Some("P000123456"));
        assert_eq!(settlement.invoice().creditor_id.as_deref(), Some("DE98ZZZ09999999999"));
        assert_eq!(settlement.description(), "Ausgleich Kreditkarte");
    }

    #[test]
    fn test_terminator_closes_block() {
        let transactions = parse(&RunLog::new());
        let last = &transactions[2];
        assert_eq!(last.partner().name.as_deref(), Some("Streaming Dienst"));
        assert_eq!(last.description(), "");
    }
}
