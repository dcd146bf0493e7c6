//! Parties of a transaction.

use serde::{Deserialize, Serialize};

/// Any party to a transaction: a counterparty, a card network, a merchant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// IBAN, e-mail address or other payment-network address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Bank or payment provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institute: Option<String>,
}

impl Account {
    pub fn new(id: Option<String>, name: Option<String>, institute: Option<String>) -> Self {
        Self {
            id: non_empty(id),
            name: non_empty(name),
            institute: non_empty(institute),
        }
    }

    /// Valid iff at least one of `id`, `name`, `institute` is set.
    pub fn is_valid(&self) -> bool {
        self.id.is_some() || self.name.is_some() || self.institute.is_some()
    }

    /// Compact key for exports: the first set field of `id`, `name`, `institute`.
    pub fn identity(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.name.as_deref())
            .or(self.institute.as_deref())
    }
}

/// The statement holder's own account.
///
/// Unlike a counterparty, an owner must always be attributable to an
/// institution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerAccount {
    #[serde(flatten)]
    pub account: Account,
}

impl OwnerAccount {
    pub fn new(id: Option<String>, name: Option<String>, institute: Option<String>) -> Self {
        Self {
            account: Account::new(id, name, institute),
        }
    }

    /// Valid iff `institute` is set and at least one of `id`/`name` is set.
    pub fn is_valid(&self) -> bool {
        self.account.institute.is_some()
            && (self.account.id.is_some() || self.account.name.is_some())
    }

    pub fn identity(&self) -> Option<&str> {
        self.account.identity()
    }

    pub fn id(&self) -> Option<&str> {
        self.account.id.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.account.name.as_deref()
    }

    pub fn institute(&self) -> Option<&str> {
        self.account.institute.as_deref()
    }
}

/// Treat blank strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
