//! Consorsbank Girokonto statements (PDF).
//!
//! Bookings are blocks opened by an upper-case kind line (`LASTSCHRIFT`,
//! `GUTSCHRIFT`, ...). The block's first text line names the partner, the
//! booking line carries yearless dates and a signed amount. Interleaved
//! `*** Kontostand zum` lines state the running balance. Blocks may continue
//! on the next page below its repeated header.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::patterns::{
    CONSORS_BALANCE, CONSORS_BLOCK_START, CONSORS_BOOKING_LINE, CONSORS_COLUMN_HEADER,
    CONSORS_CURRENCY, CONSORS_DATE_AND_NUMBER, CONSORS_HOLDER, CONSORS_SIGNED_AMOUNT, CONSORS_YEARLESS_DATE,
    VISA_TOKEN,
};
use super::{ExtractorContext, Institute, TransactionExtractor, close_block, warn_missing_iban};
use crate::error::Result;
use crate::locale::{
    IbanExtractor, extract_statement_date, parse_amount, resolve_yearless_date, split_camel_case,
};
use crate::log::RunLog;
use crate::models::{Transaction, TransactionBuilder};
use crate::pdf::StatementText;

const DEFAULT_CURRENCY: &str = "EUR";
const CREDIT_KIND: &str = "GUTSCHRIFT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsorsbankExtractor {
    pub(crate) context: ExtractorContext,
}

/// Statement-wide facts read once from the header.
struct Header {
    date: Option<NaiveDate>,
    currency: String,
    holder: Option<String>,
    iban: Option<String>,
}

impl Header {
    fn read(text: &str) -> Self {
        let iban = IbanExtractor::labeled()
            .extract(text)
            .or_else(|| IbanExtractor::compact().extract(text));
        Self {
            date: extract_statement_date(text),
            currency: CONSORS_CURRENCY
                .captures(text)
                .map_or_else(|| DEFAULT_CURRENCY.to_string(), |c| c[1].to_string()),
            holder: CONSORS_HOLDER
                .captures(text)
                .map(|c| split_camel_case(c[1].trim())),
            iban,
        }
    }
}

struct Block {
    kind: String,
    builder: TransactionBuilder,
    dated: bool,
}

impl ConsorsbankExtractor {
    pub fn new(context: ExtractorContext) -> Self {
        Self { context }
    }

    pub fn parse(&self, text: &StatementText, log: &RunLog) -> Vec<Transaction> {
        let source = self.context.source();
        let header = Header::read(&text.full_text);
        warn_missing_iban(header.iban.as_deref(), &source, log);
        if header.date.is_none() {
            log.warning(format_args!("{}: no statement date; yearless dates cannot be resolved", source));
        }

        let mut transactions = Vec::new();
        let mut open: Option<Block> = None;
        let mut previous_balance: Option<Decimal> = None;

        for line in text.pages.iter().flat_map(|page| booking_lines(page)) {
            if let Some(caps) = CONSORS_BALANCE.captures(line) {
                let balance = match parse_amount(&caps[1]) {
                    Ok(balance) => balance,
                    Err(e) => {
                        log.warning(format_args!("{}: {}", source, e));
                        continue;
                    }
                };
                if let Some(mut block) = open.take() {
                    if block.kind == CREDIT_KIND && !block.builder.has_value() {
                        if let Some(value) =
                            credit_from_balance_delta(previous_balance, balance, &source, log)
                        {
                            block.builder.value(value);
                        }
                    }
                    close_block(&block.builder, &source, log, &mut transactions);
                }
                previous_balance = Some(balance);
                continue;
            }

            if let Some(caps) = CONSORS_BLOCK_START.captures(line) {
                if let Some(done) = open.take() {
                    close_block(&done.builder, &source, log, &mut transactions);
                }
                let mut builder = self
                    .context
                    .new_transaction(Institute::Consorsbank, header.iban.as_deref());
                builder.currency(header.currency.as_str()).kind(&caps[1]);
                if let Some(holder) = &header.holder {
                    builder.owner_name(holder.as_str());
                }
                open = Some(Block {
                    kind: caps[1].to_string(),
                    builder,
                    dated: false,
                });
                continue;
            }

            let Some(block) = open.as_mut() else {
                continue;
            };
            read_block_line(block, line, header.date, &source, log);
        }

        if let Some(done) = open.take() {
            close_block(&done.builder, &source, log, &mut transactions);
        }

        transactions
    }
}

impl TransactionExtractor for ConsorsbankExtractor {
    fn institute(&self) -> Institute {
        Institute::Consorsbank
    }

    fn extract_transactions(&self, log: &RunLog) -> Result<Vec<Transaction>> {
        let text = self.context.read_pdf()?;
        Ok(self.parse(&text, log))
    }
}

/// Non-empty lines of a page below its column header. A page without the
/// header is taken whole.
fn booking_lines(page: &str) -> Vec<&str> {
    let lines: Vec<&str> = page.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let start = lines
        .iter()
        .position(|l| CONSORS_COLUMN_HEADER.is_match(l))
        .map_or(0, |i| i + 1);
    lines[start..].to_vec()
}

/// Booking line (whole or split over up to three lines), card marker,
/// partner name or free text.
fn read_block_line(
    block: &mut Block,
    line: &str,
    statement: Option<NaiveDate>,
    source: &str,
    log: &RunLog,
) {
    let builder = &mut block.builder;

    if let Some(caps) = CONSORS_BOOKING_LINE.captures(line) {
        block.dated = set_date(builder, &caps[1], statement, source, log);
        set_valuta(builder, &caps[2], statement);
        set_amount(builder, &caps[3], source, log);
        return;
    }

    if !block.dated {
        if let Some(caps) = CONSORS_DATE_AND_NUMBER.captures(line) {
            block.dated = set_date(builder, &caps[1], statement, source, log);
            if let Some(valuta) = caps.get(2) {
                set_valuta(builder, valuta.as_str(), statement);
            }
            return;
        }
    } else if CONSORS_YEARLESS_DATE.is_match(line) {
        set_valuta(builder, line, statement);
        return;
    } else if CONSORS_SIGNED_AMOUNT.is_match(line) && !builder.has_value() {
        set_amount(builder, line, source, log);
        return;
    }

    if let Some(end) = VISA_TOKEN.find(line).map(|m| m.end()) {
        let institute = line[end..].trim();
        builder
            .medium("Visa")
            .partner_institute(if institute.is_empty() { "Visa" } else { institute });
    } else if !builder.has_partner_name() {
        builder.partner_name(line);
    } else {
        builder.description(line);
    }
}

/// Returns whether the booking date was set.
fn set_date(
    builder: &mut TransactionBuilder,
    text: &str,
    statement: Option<NaiveDate>,
    source: &str,
    log: &RunLog,
) -> bool {
    match resolve_yearless_date(text, statement) {
        Ok(date) => {
            builder.date(date);
            true
        }
        Err(e) => {
            log.warning(format_args!("{}: {}", source, e));
            false
        }
    }
}

fn set_valuta(builder: &mut TransactionBuilder, text: &str, statement: Option<NaiveDate>) {
    if let Ok(valuta) = resolve_yearless_date(text, statement) {
        builder.valuta_date(valuta);
    }
}

fn set_amount(builder: &mut TransactionBuilder, text: &str, source: &str, log: &RunLog) {
    match parse_amount(text) {
        Ok(value) => {
            builder.value(value);
        }
        Err(e) => log.warning(format_args!("{}: {}", source, e)),
    }
}

/// Amount of a credit whose booking line states none: the difference between
/// the balance closing the block and the balance recorded before it.
///
/// Any other booking between the two balance lines is folded into the result,
/// so every use is reported.
fn credit_from_balance_delta(
    previous: Option<Decimal>,
    current: Decimal,
    source: &str,
    log: &RunLog,
) -> Option<Decimal> {
    let Some(previous) = previous else {
        log.warning(format_args!(
            "{}: credit without amount and no earlier balance to derive it from",
            source
        ));
        return None;
    };
    let delta = current - previous;
    log.warning(format_args!(
        "{}: credit without amount, using balance delta {} ({} -> {})",
        source, delta, previous, current
    ));
    Some(delta)
}
