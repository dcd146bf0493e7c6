//! Locale helpers for German bank statements: amounts, dates and IBANs.

pub mod amounts;
pub mod dates;
pub mod iban;
pub mod patterns;

pub use amounts::{format_amount, parse_amount};
pub use dates::{
    BookingDate, combine_date_time, comparable_timestamp, extract_statement_date, parse_date,
    resolve_yearless_date,
};
pub use iban::{IbanExtractor, validate_iban};
pub use patterns::split_camel_case;
