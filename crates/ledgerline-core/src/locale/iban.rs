//! IBAN extraction and validation for statement headers.

use regex::Regex;

use super::patterns::{IBAN_COMPACT, IBAN_DE_GROUPED, IBAN_LABELED, IBAN_LABELED_COLON};

/// Length of a German IBAN without separators.
const DE_IBAN_LENGTH: usize = 22;

/// Extracts the statement holder's IBAN with one institution-specific pattern.
pub struct IbanExtractor {
    pattern: &'static Regex,
}

impl IbanExtractor {
    /// Create an extractor using the given pattern; capture group 1 holds the IBAN.
    pub fn new(pattern: &'static Regex) -> Self {
        Self { pattern }
    }

    /// `IBAN DE..` as printed by ING and Consorsbank.
    pub fn labeled() -> Self {
        Self::new(&IBAN_LABELED)
    }

    /// `IBAN: DE..` as printed by Barclays.
    pub fn labeled_colon() -> Self {
        Self::new(&IBAN_LABELED_COLON)
    }

    /// Any grouped German IBAN, as found in CSV preambles.
    pub fn grouped() -> Self {
        Self::new(&IBAN_DE_GROUPED)
    }

    /// Compact `DE` + 20 characters.
    pub fn compact() -> Self {
        Self::new(&IBAN_COMPACT)
    }

    /// Return the first IBAN in `text` that has the expected length and a
    /// valid checksum.
    pub fn extract(&self, text: &str) -> Option<String> {
        self.pattern.captures_iter(text).find_map(|caps| {
            // Labeled forms may run into trailing digits on the same line
            let iban: String = caps[1]
                .chars()
                .filter(|c| !c.is_whitespace())
                .take(DE_IBAN_LENGTH)
                .collect();
            if iban.len() != DE_IBAN_LENGTH {
                return None;
            }
            if !validate_iban(&iban) {
                return None;
            }
            Some(iban)
        })
    }
}

/// Validate an IBAN using the checksum algorithm.
///
/// Algorithm:
/// 1. Move first 4 characters to the end
/// 2. Replace letters with numbers (A=10, B=11, ..., Z=35)
/// 3. The resulting number mod 97 should equal 1
pub fn validate_iban(iban: &str) -> bool {
    let iban: String = iban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();

    if iban.len() < 5 || !iban.is_ascii() {
        return false;
    }

    let country_code = &iban[..2];
    let check_digits = &iban[2..4];

    if !country_code.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if !check_digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    let rearranged = format!("{}{}", &iban[4..], &iban[..4]);

    // Fold digit by digit; the full number does not fit into u64
    let mut remainder: u32 = 0;
    for c in rearranged.chars() {
        let value = match c.to_digit(36) {
            Some(v) => v,
            None => return false,
        };
        if value >= 10 {
            remainder = (remainder * 100 + value) % 97;
        } else {
            remainder = (remainder * 10 + value) % 97;
        }
    }

    remainder == 1
}
