//! ING Girokonto statements (PDF).

use super::patterns::{
    ING_BOOKING_LINE, ING_CUSTOMER_REFERENCE, ING_KIND, ING_MANDATE, ING_REFERENCE,
    ING_TERMINATOR, ING_VALUTA_LINE, VISA_TOKEN,
};
use super::{ExtractorContext, Institute, TransactionExtractor, close_block, warn_missing_iban};
use crate::error::Result;
use crate::locale::{IbanExtractor, parse_amount, parse_date, split_camel_case};
use crate::log::RunLog;
use crate::models::{Transaction, TransactionBuilder};
use crate::pdf::StatementText;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngExtractor {
    pub(crate) context: ExtractorContext,
}

/// Booking block being collected.
struct OpenBooking {
    builder: TransactionBuilder,
    /// The line right after the booking line may carry the valuta date.
    expect_valuta: bool,
}

impl IngExtractor {
    pub fn new(context: ExtractorContext) -> Self {
        Self { context }
    }

    /// Parse the text of an ING statement. Blocks never span pages.
    pub fn parse(&self, text: &StatementText, log: &RunLog) -> Vec<Transaction> {
        let source = self.context.source();
        let iban = IbanExtractor::labeled().extract(&text.full_text);
        warn_missing_iban(iban.as_deref(), &source, log);

        let mut transactions = Vec::new();
        for page in &text.pages {
            let mut open: Option<OpenBooking> = None;

            for line in page.lines().map(str::trim).filter(|l| !l.is_empty()) {
                if let Some(caps) = ING_BOOKING_LINE.captures(line) {
                    if let Some(done) = open.take() {
                        close_block(&done.builder, &source, log, &mut transactions);
                    }
                    let mut builder = self.context.new_transaction(Institute::Ing, iban.as_deref());
                    self.read_booking_line(
                        &mut builder,
                        &caps[1],
                        &caps[2],
                        &caps[3],
                        caps.get(4).map_or("", |m| m.as_str()),
                        log,
                    );
                    open = Some(OpenBooking {
                        builder,
                        expect_valuta: true,
                    });
                    continue;
                }

                if ING_TERMINATOR.is_match(line) {
                    if let Some(done) = open.take() {
                        close_block(&done.builder, &source, log, &mut transactions);
                    }
                    continue;
                }

                let Some(booking) = open.as_mut() else {
                    continue;
                };

                if let Some(caps) = ING_VALUTA_LINE.captures(line) {
                    if booking.expect_valuta {
                        booking.expect_valuta = false;
                        if let Ok(valuta) = parse_date(&caps[1]) {
                            booking.builder.valuta_date(valuta);
                        }
                        if let Some(rest) = caps.get(2) {
                            booking.builder.description(rest.as_str());
                        }
                        continue;
                    }
                    // A dated line that is neither booking nor valuta ends the block
                    if let Some(done) = open.take() {
                        close_block(&done.builder, &source, log, &mut transactions);
                    }
                    continue;
                }

                booking.expect_valuta = false;
                read_continuation(&mut booking.builder, line);
            }

            if let Some(done) = open.take() {
                close_block(&done.builder, &source, log, &mut transactions);
            }
        }

        transactions
    }

    fn read_booking_line(
        &self,
        builder: &mut TransactionBuilder,
        date: &str,
        text: &str,
        amount: &str,
        rest: &str,
        log: &RunLog,
    ) {
        let source = self.context.source();
        builder.currency("EUR");

        match parse_date(date) {
            Ok(date) => {
                builder.date(date);
            }
            Err(e) => log.warning(format_args!("{}: {}", source, e)),
        }
        match parse_amount(amount) {
            Ok(value) => {
                builder.value(value);
            }
            Err(e) => log.warning(format_args!("{}: {}", source, e)),
        }

        let mut text = text.trim().to_string();
        if let Some(kind) = ING_KIND.captures(&text).map(|c| title_case(&c[1])) {
            builder.kind(kind);
            text = ING_KIND.replacen(&text, 1, "").trim().to_string();
        }

        let partner = match VISA_TOKEN.find(&text).map(|m| m.end()) {
            Some(end) => {
                builder.medium("Visa");
                text[end..].trim().to_string()
            }
            None => text,
        };
        builder.partner_name(partner).description(rest);
    }
}

impl TransactionExtractor for IngExtractor {
    fn institute(&self) -> Institute {
        Institute::Ing
    }

    fn extract_transactions(&self, log: &RunLog) -> Result<Vec<Transaction>> {
        let text = self.context.read_pdf()?;
        Ok(self.parse(&text, log))
    }
}

/// Reference, mandate, customer reference or free text below a booking.
fn read_continuation(builder: &mut TransactionBuilder, line: &str) {
    let (first, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

    if first.len() > 5 {
        if let Some(caps) = ING_REFERENCE.captures(first) {
            builder.id(format!("{}{}", &caps[1], &caps[2]));
            if let Some(institute) = caps.get(3) {
                builder.partner_institute(split_camel_case(institute.as_str()));
            }
            builder.description(rest);
            return;
        }
    }

    if let Some(caps) = ING_MANDATE.captures(line) {
        builder.mandate_reference(&caps[1]);
    } else if let Some(caps) = ING_CUSTOMER_REFERENCE.captures(line) {
        builder.customer_reference(&caps[1]);
    } else {
        builder.description(line);
    }
}

fn title_case(word: &str) -> String {
    let lower = word.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
