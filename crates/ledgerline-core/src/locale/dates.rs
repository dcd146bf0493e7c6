//! Date parsing and normalization for German statements.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::patterns::{
    ANY_FULL_DATE, DATE_FULL, DATE_YEARLESS, STATEMENT_DATE, TIME_OF_DAY, UTC_OFFSET,
};
use crate::error::ParseError;

/// Booking date of a transaction, as precise as the source provides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BookingDate {
    /// Calendar date only.
    Date(NaiveDate),
    /// Wall-clock date and time without zone.
    Local(NaiveDateTime),
    /// Date and time with a UTC offset.
    Zoned(DateTime<FixedOffset>),
}

impl BookingDate {
    /// Calendar date part.
    pub fn date(&self) -> NaiveDate {
        comparable_timestamp(*self).date()
    }
}

impl From<NaiveDate> for BookingDate {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for BookingDate {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::Local(datetime)
    }
}

impl From<DateTime<FixedOffset>> for BookingDate {
    fn from(datetime: DateTime<FixedOffset>) -> Self {
        Self::Zoned(datetime)
    }
}

impl fmt::Display for BookingDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Local(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S")),
            Self::Zoned(datetime) => write!(f, "{}", datetime.format("%Y-%m-%d %H:%M:%S %:z")),
        }
    }
}

/// Normalize any booking date to a naive timestamp.
///
/// Bare dates become midnight; zoned datetimes keep their wall-clock time and
/// drop the offset. All ordering and window checks go through this value.
pub fn comparable_timestamp(date: impl Into<BookingDate>) -> NaiveDateTime {
    match date.into() {
        BookingDate::Date(date) => date.and_time(NaiveTime::MIN),
        BookingDate::Local(datetime) => datetime,
        BookingDate::Zoned(datetime) => datetime.naive_local(),
    }
}

/// Parse `DD.MM.YYYY` or `DD.MM.YY`; two-digit years are read as `20YY`.
pub fn parse_date(text: &str) -> Result<NaiveDate, ParseError> {
    let cleaned = text.trim().replace('"', "");
    let caps = DATE_FULL.captures(&cleaned).ok_or_else(|| ParseError::Date {
        value: text.to_string(),
    })?;

    let day: u32 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);
    let year = parse_year(&caps[3]);

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ParseError::Date {
        value: text.to_string(),
    })
}

/// Parse a date that may omit its year (`DD.MM.`).
///
/// Full dates are parsed as by [`parse_date`]. A yearless fragment takes the
/// year of `statement`, the statement date found once in the document. A month
/// later than the statement month belongs to the previous year, as when a
/// January statement still lists December bookings.
pub fn resolve_yearless_date(
    text: &str,
    statement: Option<NaiveDate>,
) -> Result<NaiveDate, ParseError> {
    let cleaned = text.trim().replace('"', "");

    let Some(caps) = DATE_YEARLESS.captures(&cleaned) else {
        return parse_date(&cleaned);
    };

    let statement = statement.ok_or_else(|| ParseError::MissingYear {
        value: text.to_string(),
    })?;
    let day: u32 = caps[1].parse().unwrap_or(0);
    let month: u32 = caps[2].parse().unwrap_or(0);
    let year = if month > statement.month() {
        statement.year() - 1
    } else {
        statement.year()
    };

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| ParseError::Date {
        value: text.to_string(),
    })
}

/// Find the statement date in a document's full text.
///
/// Prefers the header date (`Datum 30.12.22`) and falls back to the first full
/// date anywhere in the text.
pub fn extract_statement_date(text: &str) -> Option<NaiveDate> {
    if let Some(date) = STATEMENT_DATE
        .captures(text)
        .and_then(|caps| parse_date(&caps[1]).ok())
    {
        return Some(date);
    }
    ANY_FULL_DATE
        .captures_iter(text)
        .find_map(|caps| parse_date(&caps[1]).ok())
}

/// Combine a booking date with a time of day and a zone designation.
///
/// Zones may be abbreviations (`CET`, `CEST`, `UTC`, `GMT`, `PST`, `PDT`, ...)
/// or numeric offsets (`+01:00`, `-0500`).
pub fn combine_date_time(
    date: NaiveDate,
    time: &str,
    zone: &str,
) -> Result<DateTime<FixedOffset>, ParseError> {
    let time_err = || ParseError::Time {
        value: format!("{} {}", time, zone),
    };

    let caps = TIME_OF_DAY.captures(time.trim()).ok_or_else(time_err)?;
    let hour: u32 = caps[1].parse().unwrap_or(99);
    let minute: u32 = caps[2].parse().unwrap_or(99);
    let second: u32 = caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let time_of_day = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(time_err)?;

    let offset = parse_zone(zone).ok_or_else(time_err)?;

    offset
        .from_local_datetime(&date.and_time(time_of_day))
        .single()
        .ok_or_else(time_err)
}

fn parse_zone(zone: &str) -> Option<FixedOffset> {
    let zone = zone.trim().to_uppercase();
    let hours = match zone.as_str() {
        "UTC" | "GMT" | "Z" | "WET" => Some(0),
        "CET" | "MEZ" | "WEST" | "BST" => Some(1),
        "CEST" | "MESZ" | "EET" => Some(2),
        "EEST" => Some(3),
        "EDT" => Some(-4),
        "EST" | "CDT" => Some(-5),
        "CST" | "MDT" => Some(-6),
        "MST" | "PDT" => Some(-7),
        "PST" => Some(-8),
        _ => None,
    };

    if let Some(hours) = hours {
        return FixedOffset::east_opt(hours * 3600);
    }

    let caps = UTC_OFFSET.captures(&zone)?;
    let hours: i32 = caps[2].parse().ok()?;
    let minutes: i32 = caps.get(3).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let seconds = hours * 3600 + minutes * 60;

    if &caps[1] == "-" {
        FixedOffset::west_opt(seconds)
    } else {
        FixedOffset::east_opt(seconds)
    }
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if s.len() == 2 { 2000 + year } else { year }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_full_year() {
        assert_eq!(parse_date("01.04.2023"), Ok(ymd(2023, 4, 1)));
        assert_eq!(parse_date(" \"15.01.2024\" "), Ok(ymd(2024, 1, 15)));
    }

    #[test]
    fn test_parse_date_two_digit_year() {
        assert_eq!(parse_date("31.10.22"), Ok(ymd(2022, 10, 31)));
        assert_eq!(parse_date("01.01.99"), Ok(ymd(2099, 1, 1)));
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("31.02.2023").is_err());
        assert!(parse_date("2023-04-01").is_err());
        assert!(parse_date("01.04.").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_resolve_yearless_date() {
        let statement = Some(ymd(2022, 11, 30));
        assert_eq!(resolve_yearless_date("01.11.", statement), Ok(ymd(2022, 11, 1)));
        assert_eq!(resolve_yearless_date("01.11.23", statement), Ok(ymd(2023, 11, 1)));
        assert_eq!(
            resolve_yearless_date("01.11.", None),
            Err(ParseError::MissingYear {
                value: "01.11.".to_string()
            })
        );
        assert!(resolve_yearless_date("32.11.", statement).is_err());
    }

    #[test]
    fn test_resolve_yearless_date_across_new_year() {
        let statement = Some(ymd(2023, 1, 5));
        assert_eq!(resolve_yearless_date("28.12.", statement), Ok(ymd(2022, 12, 28)));
        assert_eq!(resolve_yearless_date("03.01.", statement), Ok(ymd(2023, 1, 3)));
    }

    #[test]
    fn test_extract_statement_date() {
        assert_eq!(
            extract_statement_date("Kontoauszug\nDatum 30.12.22\n"),
            Some(ymd(2022, 12, 30))
        );
        assert_eq!(
            extract_statement_date("Abrechnung vom 05.03.2021 bis"),
            Some(ymd(2021, 3, 5))
        );
        assert_eq!(extract_statement_date("no dates here"), None);
    }

    #[test]
    fn test_combine_date_time() {
        let zoned = combine_date_time(ymd(2023, 7, 3), "14:05:09", "CEST").unwrap();
        assert_eq!(zoned.offset().local_minus_utc(), 7200);
        assert_eq!(zoned.naive_local(), ymd(2023, 7, 3).and_hms_opt(14, 5, 9).unwrap());

        let offset = combine_date_time(ymd(2023, 1, 3), "08:00", "-05:00").unwrap();
        assert_eq!(offset.offset().local_minus_utc(), -5 * 3600);

        assert!(combine_date_time(ymd(2023, 1, 3), "25:00", "CET").is_err());
        assert!(combine_date_time(ymd(2023, 1, 3), "10:00", "Mars/Olympus").is_err());
    }

    #[test]
    fn test_comparable_timestamp() {
        let date = ymd(2023, 4, 1);
        assert_eq!(comparable_timestamp(date), date.and_hms_opt(0, 0, 0).unwrap());

        let zoned = combine_date_time(date, "23:30", "PST").unwrap();
        assert_eq!(comparable_timestamp(zoned), date.and_hms_opt(23, 30, 0).unwrap());
    }

    #[test]
    fn test_comparable_timestamp_idempotent() {
        let inputs: Vec<BookingDate> = vec![
            ymd(2023, 4, 1).into(),
            ymd(2023, 4, 1).and_hms_opt(9, 15, 0).unwrap().into(),
            combine_date_time(ymd(2023, 4, 1), "09:15", "CET").unwrap().into(),
        ];
        for input in inputs {
            let once = comparable_timestamp(input);
            assert_eq!(comparable_timestamp(once), once);
        }
    }
}
