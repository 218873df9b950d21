//! The transaction model and how it is serialized into the user's storage blob.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

mod date_format {
    //! Serializes a [time::Date] as an ISO 8601 calendar date, e.g. "2024-01-31".
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date.format(DATE_FORMAT).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}

/// The opaque identifier of a transaction, unique within a user's collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generate a new random ID.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    #[cfg(test)]
    pub fn new_unchecked(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money received, e.g. a salary.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionKind {
    /// The label used for transactions of this kind that have no category.
    pub fn default_category(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Other Income",
            TransactionKind::Expense => "Other Expense",
        }
    }
}

/// An income or expense recorded by a user.
///
/// Transactions are never edited once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub description: String,
    /// The size of the transaction in dollars, always positive.
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(
        serialize_with = "date_format::serialize",
        deserialize_with = "date_format::deserialize"
    )]
    pub date: Date,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Transaction {
    /// The amount with the sign of its effect on the balance: positive for
    /// income, negative for expenses.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// The user supplied fields of a transaction that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Text detailing the transaction.
    pub description: String,
    /// The size of the transaction in dollars, must be positive.
    pub amount: f64,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// When the transaction happened.
    pub date: Date,
    /// An optional label for grouping transactions.
    pub category: Option<String>,
}

impl NewTransaction {
    /// Assign a fresh random ID to the transaction.
    pub fn into_transaction(self) -> Transaction {
        Transaction {
            id: TransactionId::new_random(),
            description: self.description,
            amount: self.amount,
            kind: self.kind,
            date: self.date,
            category: self.category,
        }
    }
}
