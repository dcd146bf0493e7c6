//! Billing metadata attached to a transaction.

use serde::{Deserialize, Serialize};

/// Optional invoice and SEPA direct-debit references of a transaction.
///
/// All fields are optional; an invoice without references is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Path or name of the invoice document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_reference: Option<String>,

    /// SEPA creditor identifier (Gläubiger-ID).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creditor_id: Option<String>,

    /// SEPA mandate reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mandate_reference: Option<String>,
}

impl Invoice {
    /// Valid iff no set reference is blank.
    pub fn is_valid(&self) -> bool {
        self.references().all(|r| !r.trim().is_empty())
    }

    /// Whether any reference is set.
    pub fn is_empty(&self) -> bool {
        self.references().next().is_none()
    }

    fn references(&self) -> impl Iterator<Item = &str> {
        [
            &self.id,
            &self.document,
            &self.customer_reference,
            &self.creditor_id,
            &self.mandate_reference,
        ]
        .into_iter()
        .filter_map(|r| r.as_deref())
    }
}
