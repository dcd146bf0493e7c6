//! Ordered aggregate of transactions.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::transaction::Transaction;
use crate::locale::comparable_timestamp;

/// Field a [`TransactionCollection`] can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Date,
    ValutaDate,
    Value,
    Currency,
    Description,
    Source,
    Id,
    Type,
    Medium,
    Owner,
    Partner,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(Self::Date),
            "valuta_date" | "valuta" => Ok(Self::ValutaDate),
            "value" | "amount" => Ok(Self::Value),
            "currency" => Ok(Self::Currency),
            "description" => Ok(Self::Description),
            "source" => Ok(Self::Source),
            "id" => Ok(Self::Id),
            "type" => Ok(Self::Type),
            "medium" => Ok(Self::Medium),
            "owner" => Ok(Self::Owner),
            "partner" => Ok(Self::Partner),
            other => Err(format!("unknown sort field '{}'", other)),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Date => "date",
            Self::ValutaDate => "valuta_date",
            Self::Value => "value",
            Self::Currency => "currency",
            Self::Description => "description",
            Self::Source => "source",
            Self::Id => "id",
            Self::Type => "type",
            Self::Medium => "medium",
            Self::Owner => "owner",
            Self::Partner => "partner",
        };
        f.write_str(name)
    }
}

/// Ordered, growable list of transactions.
///
/// No de-duplication happens here; a statement loaded twice yields every
/// transaction twice with identical ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TransactionCollection {
    transactions: Vec<Transaction>,
}

impl TransactionCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    pub fn extend(&mut self, transactions: impl IntoIterator<Item = Transaction>) {
        self.transactions.extend(transactions);
    }

    /// All transactions in current order.
    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Transaction> {
        self.transactions.iter()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Stable sort by `field`; text fields compare case-insensitively and
    /// absent values sort first.
    pub fn sort_by(&mut self, field: SortField) {
        self.transactions.sort_by(|a, b| compare(a, b, field));
    }

    /// Stable sort by normalized booking timestamp.
    pub fn sort_by_date(&mut self) {
        self.sort_by(SortField::Date);
    }
}

impl FromIterator<Transaction> for TransactionCollection {
    fn from_iter<I: IntoIterator<Item = Transaction>>(iter: I) -> Self {
        Self {
            transactions: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for TransactionCollection {
    type Item = Transaction;
    type IntoIter = std::vec::IntoIter<Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.into_iter()
    }
}

impl<'a> IntoIterator for &'a TransactionCollection {
    type Item = &'a Transaction;
    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

fn compare(a: &Transaction, b: &Transaction, field: SortField) -> Ordering {
    match field {
        SortField::Date => comparable_timestamp(a.date()).cmp(&comparable_timestamp(b.date())),
        SortField::ValutaDate => {
            comparable_timestamp(a.valuta_date()).cmp(&comparable_timestamp(b.valuta_date()))
        }
        SortField::Value => a.value().cmp(&b.value()),
        SortField::Currency => compare_text(Some(a.currency()), Some(b.currency())),
        SortField::Description => compare_text(Some(a.description()), Some(b.description())),
        SortField::Source => compare_text(Some(a.source()), Some(b.source())),
        SortField::Id => compare_text(Some(a.id()), Some(b.id())),
        SortField::Type => compare_text(a.kind(), b.kind()),
        SortField::Medium => compare_text(a.medium(), b.medium()),
        SortField::Owner => compare_text(a.owner().identity(), b.owner().identity()),
        SortField::Partner => compare_text(a.partner().identity(), b.partner().identity()),
    }
}

fn compare_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    a.map(str::to_lowercase).cmp(&b.map(str::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::combine_date_time;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn transaction(date: impl Into<crate::locale::BookingDate>, value: i64, text: &str) -> Transaction {
        let mut builder = Transaction::builder();
        builder
            .date(date)
            .value(Decimal::new(value, 2))
            .currency("EUR")
            .description(text)
            .owner_name("Max Mustermann")
            .owner_institute("DKB")
            .partner_name(text)
            .source("test.csv");
        builder.build().unwrap()
    }

    fn descriptions(collection: &TransactionCollection) -> Vec<&str> {
        collection.iter().map(|t| t.description()).collect()
    }

    #[test]
    fn test_sort_by_date_mixes_dates_and_datetimes() {
        let mut collection = TransactionCollection::new();
        collection.append(transaction(ymd(2023, 4, 2), 100, "second day"));
        collection.append(transaction(
            combine_date_time(ymd(2023, 4, 1), "18:30", "CEST").unwrap(),
            100,
            "evening",
        ));
        collection.append(transaction(ymd(2023, 4, 1), 100, "midnight"));

        collection.sort_by_date();
        assert_eq!(descriptions(&collection), vec!["midnight", "evening", "second day"]);
    }

    #[test]
    fn test_sort_is_stable_and_case_insensitive() {
        let mut collection: TransactionCollection = vec![
            transaction(ymd(2023, 4, 1), 100, "beta"),
            transaction(ymd(2023, 4, 1), 300, "Alpha"),
            transaction(ymd(2023, 4, 1), 200, "alpha"),
        ]
        .into_iter()
        .collect();

        collection.sort_by(SortField::Description);
        let values: Vec<Decimal> = collection.iter().map(|t| t.value()).collect();
        assert_eq!(values, vec![Decimal::new(300, 2), Decimal::new(200, 2), Decimal::new(100, 2)]);

        collection.sort_by(SortField::Value);
        assert_eq!(descriptions(&collection), vec!["beta", "alpha", "Alpha"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut collection = TransactionCollection::new();
        let t = transaction(ymd(2023, 4, 1), 100, "same");
        collection.extend(vec![t.clone(), t]);
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.all()[0].id(), collection.all()[1].id());
    }

    #[test]
    fn test_sort_field_from_str() {
        assert_eq!("Date".parse::<SortField>(), Ok(SortField::Date));
        assert_eq!("valuta_date".parse::<SortField>(), Ok(SortField::ValutaDate));
        assert_eq!("partner".parse::<SortField>(), Ok(SortField::Partner));
        assert!("colour".parse::<SortField>().is_err());
        assert_eq!(SortField::ValutaDate.to_string(), "valuta_date");
    }
}
