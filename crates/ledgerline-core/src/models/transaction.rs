//! The canonical transaction record and its builder.

use std::cmp::Ordering;

use data_encoding::BASE32;
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use sha2::{Digest, Sha256};

use super::account::{Account, OwnerAccount, non_empty};
use super::invoice::Invoice;
use crate::error::ExtractionError;
use crate::locale::BookingDate;

/// Prefix of every derived transaction id.
pub const ID_PREFIX: &str = "TID";

/// Number of base-32 characters kept from the digest.
const ID_HASH_LENGTH: usize = 15;

/// Ordered flat view of a transaction, as consumed by exporters.
pub type Dictionary = Vec<(&'static str, Option<String>)>;

/// One booking on a statement.
///
/// Built through [`TransactionBuilder`]; immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: String,
    date: BookingDate,
    valuta_date: Option<BookingDate>,
    value: Decimal,
    currency: String,
    description: String,
    kind: Option<String>,
    medium: Option<String>,
    related_transaction_id: Option<String>,
    owner: OwnerAccount,
    partner: Account,
    invoice: Invoice,
    source: String,
}

impl Transaction {
    pub fn builder() -> TransactionBuilder {
        TransactionBuilder::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> BookingDate {
        self.date
    }

    /// Value date; the booking date when the source has none.
    pub fn valuta_date(&self) -> BookingDate {
        self.valuta_date.unwrap_or(self.date)
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Free-text classification such as "Lastschrift" or "Gutschrift".
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    /// Payment instrument such as "Visa".
    pub fn medium(&self) -> Option<&str> {
        self.medium.as_deref()
    }

    pub fn related_transaction_id(&self) -> Option<&str> {
        self.related_transaction_id.as_deref()
    }

    pub fn owner(&self) -> &OwnerAccount {
        &self.owner
    }

    pub fn partner(&self) -> &Account {
        &self.partner
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    /// Path of the document this transaction was read from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Identity of the party the money comes from.
    ///
    /// Negative values are paid by the owner, positive values by the partner.
    /// A zero value has no direction.
    pub fn sender(&self) -> Option<&str> {
        match self.value.cmp(&Decimal::ZERO) {
            Ordering::Less => self.owner.identity(),
            Ordering::Greater => self.partner.identity(),
            Ordering::Equal => None,
        }
    }

    /// Identity of the party the money goes to.
    pub fn receiver(&self) -> Option<&str> {
        match self.value.cmp(&Decimal::ZERO) {
            Ordering::Less => self.partner.identity(),
            Ordering::Greater => self.owner.identity(),
            Ordering::Equal => None,
        }
    }

    /// Flat key/value view with `owner_*`, `partner_*` and `invoice_*` sub-fields.
    pub fn dictionary(&self) -> Dictionary {
        let owner = &self.owner.account;
        vec![
            ("id", Some(self.id.clone())),
            ("date", Some(self.date.to_string())),
            ("valuta_date", Some(self.valuta_date().to_string())),
            ("value", Some(self.value.to_string())),
            ("currency", Some(self.currency.clone())),
            ("sender", self.sender().map(str::to_string)),
            ("receiver", self.receiver().map(str::to_string)),
            ("description", Some(self.description.clone()).filter(|d| !d.is_empty())),
            ("type", self.kind.clone()),
            ("medium", self.medium.clone()),
            ("related_transaction_id", self.related_transaction_id.clone()),
            ("source", Some(self.source.clone())),
            ("owner_id", owner.id.clone()),
            ("owner_name", owner.name.clone()),
            ("owner_institute", owner.institute.clone()),
            ("partner_id", self.partner.id.clone()),
            ("partner_name", self.partner.name.clone()),
            ("partner_institute", self.partner.institute.clone()),
            ("invoice_id", self.invoice.id.clone()),
            ("invoice_document", self.invoice.document.clone()),
            ("invoice_customer_reference", self.invoice.customer_reference.clone()),
            ("invoice_creditor_id", self.invoice.creditor_id.clone()),
            ("invoice_mandate_reference", self.invoice.mandate_reference.clone()),
        ]
    }

    /// Content-derived identifier, independent of processing order.
    pub fn derived_id(&self) -> String {
        let digest = Sha256::digest(self.canonical_string().as_bytes());
        let encoded = BASE32.encode(&digest).replace('=', "");
        format!("{}{}", ID_PREFIX, &encoded[..ID_HASH_LENGTH])
    }

    fn canonical_string(&self) -> String {
        self.dictionary()
            .into_iter()
            .filter(|(key, _)| *key != "id")
            .map(|(key, value)| {
                format!(
                    "{}: {} \n",
                    title_case(key),
                    value.as_deref().unwrap_or("N/A")
                )
            })
            .collect()
    }

    /// Set the id unless one is already present.
    fn assign_id(&mut self, provided: Option<String>) {
        if !self.id.is_empty() {
            return;
        }
        self.id = match provided {
            Some(id) => id,
            None => self.derived_id(),
        };
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let dictionary = self.dictionary();
        let mut map = serializer.serialize_map(Some(dictionary.len()))?;
        for (key, value) in &dictionary {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

fn title_case(key: &str) -> String {
    key.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Accumulates a transaction while an extractor scans a booking block.
///
/// Fields may be set in any order; blank strings count as unset.
/// [`build`](Self::build) validates and derives the id.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    id: Option<String>,
    date: Option<BookingDate>,
    valuta_date: Option<BookingDate>,
    value: Option<Decimal>,
    currency: Option<String>,
    description: Vec<String>,
    kind: Option<String>,
    medium: Option<String>,
    related_transaction_id: Option<String>,
    owner: OwnerAccount,
    partner: Account,
    invoice: Invoice,
    source: Option<String>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source-provided transaction id. The first id set wins.
    pub fn id(&mut self, id: impl Into<String>) -> &mut Self {
        if self.id.is_none() {
            self.id = non_empty(Some(id.into()));
        }
        self
    }

    pub fn date(&mut self, date: impl Into<BookingDate>) -> &mut Self {
        self.date = Some(date.into());
        self
    }

    pub fn valuta_date(&mut self, date: impl Into<BookingDate>) -> &mut Self {
        self.valuta_date = Some(date.into());
        self
    }

    pub fn value(&mut self, value: Decimal) -> &mut Self {
        self.value = Some(value);
        self
    }

    pub fn currency(&mut self, currency: impl Into<String>) -> &mut Self {
        self.currency = non_empty(Some(currency.into())).map(|c| c.to_uppercase());
        self
    }

    /// Append a description fragment; fragments are joined by single spaces.
    pub fn description(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            self.description.push(text);
        }
        self
    }

    pub fn kind(&mut self, kind: impl Into<String>) -> &mut Self {
        self.kind = non_empty(Some(kind.into()));
        self
    }

    pub fn medium(&mut self, medium: impl Into<String>) -> &mut Self {
        self.medium = non_empty(Some(medium.into()));
        self
    }

    pub fn related_transaction_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.related_transaction_id = non_empty(Some(id.into()));
        self
    }

    pub fn owner_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.owner.account.id = non_empty(Some(id.into()));
        self
    }

    pub fn owner_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.owner.account.name = non_empty(Some(name.into()));
        self
    }

    pub fn owner_institute(&mut self, institute: impl Into<String>) -> &mut Self {
        self.owner.account.institute = non_empty(Some(institute.into()));
        self
    }

    pub fn partner_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.partner.id = non_empty(Some(id.into()));
        self
    }

    pub fn partner_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.partner.name = non_empty(Some(name.into()));
        self
    }

    pub fn partner_institute(&mut self, institute: impl Into<String>) -> &mut Self {
        self.partner.institute = non_empty(Some(institute.into()));
        self
    }

    pub fn invoice_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.invoice.id = non_empty(Some(id.into()));
        self
    }

    pub fn invoice_document(&mut self, document: impl Into<String>) -> &mut Self {
        self.invoice.document = non_empty(Some(document.into()));
        self
    }

    pub fn customer_reference(&mut self, reference: impl Into<String>) -> &mut Self {
        self.invoice.customer_reference = non_empty(Some(reference.into()));
        self
    }

    pub fn creditor_id(&mut self, creditor_id: impl Into<String>) -> &mut Self {
        self.invoice.creditor_id = non_empty(Some(creditor_id.into()));
        self
    }

    pub fn mandate_reference(&mut self, reference: impl Into<String>) -> &mut Self {
        self.invoice.mandate_reference = non_empty(Some(reference.into()));
        self
    }

    pub fn source(&mut self, source: impl Into<String>) -> &mut Self {
        self.source = non_empty(Some(source.into()));
        self
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn has_partner_name(&self) -> bool {
        self.partner.name.is_some()
    }

    pub fn current_value(&self) -> Option<Decimal> {
        self.value
    }

    /// Validate the collected fields and produce the transaction.
    ///
    /// The id is the source-provided one if set, otherwise derived from the
    /// transaction's content.
    pub fn build(&self) -> Result<Transaction, ExtractionError> {
        let value = self.value.ok_or(ExtractionError::MissingField("value"))?;
        let currency = self
            .currency
            .clone()
            .ok_or(ExtractionError::MissingField("currency"))?;
        let date = self.date.ok_or(ExtractionError::MissingField("date"))?;
        let source = self
            .source
            .clone()
            .ok_or(ExtractionError::MissingField("source"))?;

        if !self.owner.is_valid() {
            return Err(ExtractionError::InvalidAccount { role: "owner" });
        }
        if !self.partner.is_valid() {
            return Err(ExtractionError::InvalidAccount { role: "partner" });
        }
        if !self.invoice.is_valid() {
            return Err(ExtractionError::InvalidInvoice);
        }

        let mut transaction = Transaction {
            id: String::new(),
            date,
            valuta_date: self.valuta_date,
            value,
            currency,
            description: self.description.join(" "),
            kind: self.kind.clone(),
            medium: self.medium.clone(),
            related_transaction_id: self.related_transaction_id.clone(),
            owner: self.owner.clone(),
            partner: self.partner.clone(),
            invoice: self.invoice.clone(),
            source,
        };
        transaction.assign_id(self.id.clone());

        Ok(transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn sample(value: &str) -> TransactionBuilder {
        let mut builder = Transaction::builder();
        builder
            .date(NaiveDate::from_ymd_opt(2023, 4, 1).unwrap())
            .value(Decimal::from_str(value).unwrap())
            .currency("eur")
            .description("Miete")
            .description("  April   2023 ")
            .owner_id("DE89370400440532013000")
            .owner_institute("DKB")
            .partner_name("Hausverwaltung Muster")
            .partner_id("DE02120300000000202051")
            .source("statements/dkb.csv");
        builder
    }

    #[test]
    fn test_build_normalizes_fields() {
        let transaction = sample("-750.00").build().unwrap();
        assert_eq!(transaction.currency(), "EUR");
        assert_eq!(transaction.description(), "Miete April 2023");
        assert_eq!(transaction.valuta_date(), transaction.date());
        assert!(transaction.id().starts_with(ID_PREFIX));
        assert_eq!(transaction.id().len(), ID_PREFIX.len() + 15);
    }

    #[test]
    fn test_build_missing_fields() {
        let mut builder = sample("1.00");
        builder.value = None;
        assert_eq!(builder.build().unwrap_err(), ExtractionError::MissingField("value"));

        let mut builder = sample("1.00");
        builder.currency = None;
        assert_eq!(builder.build().unwrap_err(), ExtractionError::MissingField("currency"));

        let mut builder = sample("1.00");
        builder.date = None;
        assert_eq!(builder.build().unwrap_err(), ExtractionError::MissingField("date"));
    }

    #[test]
    fn test_build_rejects_invalid_accounts() {
        let mut builder = sample("1.00");
        builder.owner.account.institute = None;
        assert_eq!(
            builder.build().unwrap_err(),
            ExtractionError::InvalidAccount { role: "owner" }
        );

        let mut builder = sample("1.00");
        builder.partner = Account::default();
        assert_eq!(
            builder.build().unwrap_err(),
            ExtractionError::InvalidAccount { role: "partner" }
        );
    }

    #[test]
    fn test_build_rejects_blank_invoice_reference() {
        let mut builder = sample("-42.00");
        builder.creditor_id("DE98ZZZ09999999999");
        assert!(builder.build().is_ok());

        builder.invoice.mandate_reference = Some(" ".to_string());
        assert_eq!(builder.build().unwrap_err(), ExtractionError::InvalidInvoice);
    }

    #[test]
    fn test_sender_receiver_follow_sign() {
        let debit = sample("-12.50").build().unwrap();
        assert_eq!(debit.sender(), Some("DE89370400440532013000"));
        assert_eq!(debit.receiver(), Some("DE02120300000000202051"));

        let credit = sample("12.50").build().unwrap();
        assert_eq!(credit.sender(), Some("DE02120300000000202051"));
        assert_eq!(credit.receiver(), Some("DE89370400440532013000"));

        let zero = sample("0").build().unwrap();
        assert_eq!(zero.sender(), None);
        assert_eq!(zero.receiver(), None);
    }

    #[test]
    fn test_id_is_deterministic() {
        let first = sample("-750.00").build().unwrap();
        let second = sample("-750.00").build().unwrap();
        assert_eq!(first.id(), second.id());

        let other = sample("-750.01").build().unwrap();
        assert_ne!(first.id(), other.id());
    }

    #[test]
    fn test_source_id_wins_and_is_set_once() {
        let mut builder = sample("5.00");
        builder.id("5AB12345CD678901E").id("IGNORED");
        let transaction = builder.build().unwrap();
        assert_eq!(transaction.id(), "5AB12345CD678901E");

        let mut transaction = transaction;
        transaction.assign_id(Some("OTHER".to_string()));
        assert_eq!(transaction.id(), "5AB12345CD678901E");
    }

    #[test]
    fn test_dictionary_keys_and_values() {
        let mut builder = sample("-750.00");
        builder.mandate_reference("M-1").kind("Lastschrift");
        let transaction = builder.build().unwrap();
        let dictionary = transaction.dictionary();

        let keys: Vec<&str> = dictionary.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            keys,
            vec![
                "id",
                "date",
                "valuta_date",
                "value",
                "currency",
                "sender",
                "receiver",
                "description",
                "type",
                "medium",
                "related_transaction_id",
                "source",
                "owner_id",
                "owner_name",
                "owner_institute",
                "partner_id",
                "partner_name",
                "partner_institute",
                "invoice_id",
                "invoice_document",
                "invoice_customer_reference",
                "invoice_creditor_id",
                "invoice_mandate_reference",
            ]
        );

        let lookup = |key: &str| {
            dictionary
                .iter()
                .find(|(k, _)| *k == key)
                .and_then(|(_, v)| v.clone())
        };
        assert_eq!(lookup("date"), Some("2023-04-01".to_string()));
        assert_eq!(lookup("value"), Some("-750.00".to_string()));
        assert_eq!(lookup("type"), Some("Lastschrift".to_string()));
        assert_eq!(lookup("invoice_mandate_reference"), Some("M-1".to_string()));
        assert_eq!(lookup("medium"), None);
    }

    #[test]
    fn test_canonical_string_format() {
        let transaction = sample("-750.00").build().unwrap();
        let canonical = transaction.canonical_string();
        assert!(canonical.starts_with("Date: 2023-04-01 \nValuta Date: 2023-04-01 \n"));
        assert!(canonical.contains("Medium: N/A \n"));
        assert!(canonical.contains("Related Transaction Id: N/A \n"));
        assert!(!canonical.contains("Id: TID"));
    }

    #[test]
    fn test_serialize_flat() {
        let transaction = sample("-750.00").build().unwrap();
        let json = serde_json::to_value(&transaction).unwrap();
        assert_eq!(json["currency"], "EUR");
        assert_eq!(json["owner_institute"], "DKB");
        assert_eq!(json["partner_institute"], serde_json::Value::Null);
        assert_eq!(json["id"], transaction.id());
    }
}
