//! Amount parsing for German statement formats.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT_BODY;
use crate::error::ParseError;

/// Parse a German-formatted amount (e.g. `"1.234,56-"`, `"-50,00"`, `"(8,99)"`).
///
/// Quotes, whitespace and non-breaking spaces are ignored. The sign may be
/// trailing (`50,00+`), leading (`-50,00`) or parenthetical (`(50,00)`), but
/// only one of those forms at a time. `.` groups thousands, `,` separates
/// decimals.
pub fn parse_amount(text: &str) -> Result<Decimal, ParseError> {
    let err = || ParseError::Amount {
        value: text.to_string(),
    };

    let cleaned: String = text
        .chars()
        .filter(|c| *c != '"' && !c.is_whitespace() && *c != '\u{00a0}')
        .collect();

    let (negative, body) = split_sign(&cleaned).ok_or_else(err)?;

    if !AMOUNT_BODY.is_match(body) {
        return Err(err());
    }

    let normalized = body.replace('.', "").replace(',', ".");
    let amount = Decimal::from_str(&normalized).map_err(|_| err())?;

    Ok(if negative { -amount } else { amount })
}

fn split_sign(cleaned: &str) -> Option<(bool, &str)> {
    if cleaned.is_empty() {
        return None;
    }

    if let Some(inner) = cleaned.strip_prefix('(') {
        return inner.strip_suffix(')').map(|body| (true, body));
    }

    let leading = cleaned.chars().next().filter(|c| *c == '+' || *c == '-');
    let trailing = cleaned.chars().last().filter(|c| *c == '+' || *c == '-');

    match (leading, trailing) {
        (Some(_), Some(_)) if cleaned.len() > 1 => None,
        (Some(sign), _) => Some((sign == '-', &cleaned[1..])),
        (None, Some(sign)) => Some((sign == '-', &cleaned[..cleaned.len() - 1])),
        (None, None) => Some((false, cleaned)),
    }
}

/// Format an amount in German style with a trailing sign (`1.234,56+`).
///
/// This is the inverse of [`parse_amount`] for values with two decimals.
pub fn format_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let (integer_part, decimal_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push('.');
        }
        formatted.push(*c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        '-'
    } else {
        '+'
    };

    format!("{},{}{}", formatted, decimal_part, sign)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_trailing_sign() {
        assert_eq!(parse_amount("50,00+"), Ok(dec("50.00")));
        assert_eq!(parse_amount("8,99-"), Ok(dec("-8.99")));
        assert_eq!(parse_amount("34.360,45+"), Ok(dec("34360.45")));
        assert_eq!(parse_amount("\"50,00+\""), Ok(dec("50.00")));
    }

    #[test]
    fn test_parse_leading_sign() {
        assert_eq!(parse_amount("-1.234,56"), Ok(dec("-1234.56")));
        assert_eq!(parse_amount("+12,00"), Ok(dec("12.00")));
        assert_eq!(parse_amount("1 234,56"), Ok(dec("1234.56")));
        assert_eq!(parse_amount("-\u{00a0}7,50"), Ok(dec("-7.50")));
    }

    #[test]
    fn test_parse_parenthetical_sign() {
        assert_eq!(parse_amount("(17,00)"), Ok(dec("-17.00")));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("-").is_err());
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("-12,00-").is_err());
        assert!(parse_amount("1,234.56").is_err());
        assert!(parse_amount("(12,00").is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("1234.56")), "1.234,56+");
        assert_eq!(format_amount(dec("-50")), "50,00-");
        assert_eq!(format_amount(dec("12345678.9")), "12.345.678,90+");
        assert_eq!(format_amount(Decimal::ZERO), "0,00+");
    }

    #[test]
    fn test_format_then_parse_restores_value() {
        for value in ["0.01", "-0.01", "999.99", "-1000.00", "1234567.89", "-42.10"] {
            let amount = dec(value);
            assert_eq!(parse_amount(&format_amount(amount)), Ok(amount), "value {value}");
        }
    }
}
