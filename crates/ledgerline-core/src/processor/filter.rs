//! Filter stage: keep transactions booked inside the date window.

use crate::log::RunLog;
use crate::models::{DateWindow, TransactionCollection};

/// Keep the transactions whose normalized booking day lies in `window`.
///
/// Both bounds are inclusive. Every transaction carries a booking date, so
/// nothing is dropped for lack of one.
pub fn filter(collection: TransactionCollection, window: DateWindow, log: &RunLog) -> TransactionCollection {
    if window.is_unbounded() {
        return collection;
    }

    let total = collection.len();
    let kept: TransactionCollection = collection
        .into_iter()
        .filter(|t| window.contains(t.date()))
        .collect();

    log.info(format_args!(
        "date filter {}..{}: kept {} of {} transactions",
        window.from.map_or_else(|| "*".to_string(), |d| d.to_string()),
        window.to.map_or_else(|| "*".to_string(), |d| d.to_string()),
        kept.len(),
        total
    ));
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::combine_date_time;
    use crate::models::Transaction;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn transaction(date: impl Into<crate::locale::BookingDate>, text: &str) -> Transaction {
        let mut builder = Transaction::builder();
        builder
            .date(date)
            .value(Decimal::ONE)
            .currency("EUR")
            .owner_name("Max Mustermann")
            .owner_institute("DKB")
            .partner_name(text)
            .source("test.csv");
        builder.build().unwrap()
    }

    fn collection() -> TransactionCollection {
        [
            transaction(ymd(2023, 3, 31), "before"),
            transaction(ymd(2023, 4, 1), "first day"),
            transaction(
                combine_date_time(ymd(2023, 4, 30), "23:30:00", "CEST").unwrap(),
                "last day late",
            ),
            transaction(ymd(2023, 5, 1), "after"),
        ]
        .into_iter()
        .collect()
    }

    fn partners(collection: &TransactionCollection) -> Vec<&str> {
        collection
            .iter()
            .filter_map(|t| t.partner().name.as_deref())
            .collect()
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let window = DateWindow::new(Some(ymd(2023, 4, 1)), Some(ymd(2023, 4, 30)));
        let kept = filter(collection(), window, &RunLog::new());
        assert_eq!(partners(&kept), vec!["first day", "last day late"]);
    }

    #[test]
    fn test_open_bounds() {
        let log = RunLog::new();
        let from_only = filter(collection(), DateWindow::new(Some(ymd(2023, 4, 30)), None), &log);
        assert_eq!(partners(&from_only), vec!["last day late", "after"]);

        let unbounded = filter(collection(), DateWindow::default(), &log);
        assert_eq!(unbounded.len(), 4);
        assert_eq!(log.warning_count(), 0);
    }
}
