//! Common regex patterns for German statement text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Unsigned amount body after sign and whitespace removal: 1.234,56 or 1234,56 or 50
    pub static ref AMOUNT_BODY: Regex = Regex::new(
        r"^(?:\d{1,3}(?:\.\d{3})+|\d+)(?:,\d+)?$"
    ).unwrap();

    // DD.MM.YYYY or DD.MM.YY
    pub static ref DATE_FULL: Regex = Regex::new(
        r"^(\d{1,2})\.(\d{1,2})\.(\d{4}|\d{2})$"
    ).unwrap();

    // DD.MM. without a year
    pub static ref DATE_YEARLESS: Regex = Regex::new(
        r"^(\d{1,2})\.(\d{1,2})\.$"
    ).unwrap();

    // Statement header date, e.g. "Datum 30.12.22"
    pub static ref STATEMENT_DATE: Regex = Regex::new(
        r"Datum\s+(\d{2}\.\d{2}\.(?:\d{4}|\d{2}))\b"
    ).unwrap();

    // Any full date anywhere in a text
    pub static ref ANY_FULL_DATE: Regex = Regex::new(
        r"\b(\d{2}\.\d{2}\.(?:\d{4}|\d{2}))\b"
    ).unwrap();

    // Time of day, HH:MM or HH:MM:SS
    pub static ref TIME_OF_DAY: Regex = Regex::new(
        r"^(\d{1,2}):(\d{2})(?::(\d{2}))?$"
    ).unwrap();

    // Numeric UTC offset, +01:00 / -0500 / +02
    pub static ref UTC_OFFSET: Regex = Regex::new(
        r"^(?:UTC|GMT)?([+-])(\d{2}):?(\d{2})?$"
    ).unwrap();

    // German IBAN as printed in statements, optionally grouped by spaces
    pub static ref IBAN_DE_GROUPED: Regex = Regex::new(
        r"\b(DE\d{2}(?: ?\d{4}){4} ?\d{2})\b"
    ).unwrap();

    // Labeled IBAN "IBAN DE.." (ING, Consorsbank)
    pub static ref IBAN_LABELED: Regex = Regex::new(
        r"IBAN\s+(DE[0-9 ]{20,30})"
    ).unwrap();

    // Labeled IBAN with colon "IBAN: DE.." (Barclays)
    pub static ref IBAN_LABELED_COLON: Regex = Regex::new(
        r"IBAN\s*:\s*(DE[0-9 ]{20,30})"
    ).unwrap();

    // Compact IBAN without separators
    pub static ref IBAN_COMPACT: Regex = Regex::new(
        r"\b(DE[0-9A-Z]{20})\b"
    ).unwrap();

    // Lower-case letter directly followed by an upper-case letter
    pub static ref CAMEL_BOUNDARY: Regex = Regex::new(
        r"([a-z])([A-Z])"
    ).unwrap();
}

/// Insert a space at every lower/upper case boundary ("GooglePay" -> "Google Pay").
pub fn split_camel_case(text: &str) -> String {
    CAMEL_BOUNDARY.replace_all(text, "$1 $2").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_camel_case() {
        assert_eq!(split_camel_case("GooglePay"), "Google Pay");
        assert_eq!(split_camel_case("MaxMuster-Frau"), "Max Muster-Frau");
        assert_eq!(split_camel_case("plain"), "plain");
    }

    #[test]
    fn test_amount_body() {
        assert!(AMOUNT_BODY.is_match("1.234,56"));
        assert!(AMOUNT_BODY.is_match("1234,56"));
        assert!(AMOUNT_BODY.is_match("50"));
        assert!(!AMOUNT_BODY.is_match("12.34,5.6"));
        assert!(!AMOUNT_BODY.is_match("1,234.56"));
        assert!(!AMOUNT_BODY.is_match("abc"));
    }
}
