use crate::error::ErrorType;
use crate::model::{Amount, Categories};
use crate::Result;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// The date format used everywhere a date is written as text.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Whether money came in or went out. This determines the sign of a transaction in every
/// aggregation; the amount itself is always positive.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

serde_plain::derive_display_from_serialize!(TransactionType);
serde_plain::derive_fromstr_from_deserialize!(TransactionType);

impl TransactionType {
    /// The human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

/// The settlement status of a transaction.
///
/// Records written before the status field existed have no value, which is read as `Cleared`.
/// Values other than `cleared` and `pending` are kept verbatim in `Other` so that they survive a
/// backup and restore.
#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TransactionStatus {
    #[default]
    Cleared,
    Pending,
    Other(String),
}

impl TransactionStatus {
    /// Reads a status value. Missing, empty or whitespace-only input is `Cleared`; anything else
    /// is trimmed and used as-is.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim() {
            "" | "cleared" => TransactionStatus::Cleared,
            "pending" => TransactionStatus::Pending,
            other => TransactionStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TransactionStatus::Cleared => "cleared",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Other(s) => s.as_str(),
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TransactionStatus {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TransactionStatus {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(Self::parse_lenient(s.as_deref().unwrap_or_default()))
    }
}

/// A single financial event.
///
/// The field names serialize in camelCase so that the persisted JSON matches the CSV header
/// (`categoryId`).
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub(crate) id: String,
    pub(crate) date: NaiveDate,
    #[serde(rename = "type")]
    pub(crate) kind: TransactionType,
    pub(crate) description: String,
    pub(crate) amount: Amount,
    pub(crate) category_id: String,
    #[serde(default)]
    pub(crate) status: TransactionStatus,
}

impl Transaction {
    /// Creates a transaction from `draft` with a freshly generated id.
    pub fn new(draft: TransactionDraft) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), draft)
    }

    /// Creates a transaction from `draft` that keeps an existing `id`.
    pub fn with_id(id: impl Into<String>, draft: TransactionDraft) -> Self {
        Self {
            id: id.into(),
            date: draft.date,
            kind: draft.kind,
            description: draft.description,
            amount: draft.amount,
            category_id: draft.category_id,
            status: draft.status,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> TransactionType {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn status(&self) -> &TransactionStatus {
        &self.status
    }

    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// The calendar month, 1 through 12.
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Returns the editable fields of this transaction.
    pub fn to_draft(&self) -> TransactionDraft {
        TransactionDraft {
            date: self.date,
            kind: self.kind,
            description: self.description.clone(),
            amount: self.amount,
            category_id: self.category_id.clone(),
            status: self.status.clone(),
        }
    }
}

/// The user-editable fields of a transaction, before an id has been assigned.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub description: String,
    pub amount: Amount,
    pub category_id: String,
    #[serde(default)]
    pub status: TransactionStatus,
}

impl TransactionDraft {
    pub fn new(
        date: NaiveDate,
        kind: TransactionType,
        description: impl Into<String>,
        amount: impl Into<Amount>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            date,
            kind,
            description: description.into(),
            amount: amount.into(),
            category_id: category_id.into(),
            status: TransactionStatus::Cleared,
        }
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    /// Checks the rules enforced at the point of entry:
    /// - the description must not be blank
    /// - the amount must be greater than zero and at most [`Amount::MAX_ENTRY`]
    /// - the category must be one of `categories`
    ///
    /// # Errors
    /// Returns an error tagged `ErrorType::Validation` describing the first rule that failed.
    pub fn validate(&self, categories: &Categories) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(ErrorType::Validation.err("Description must not be empty"));
        }
        if !self.amount.is_positive() {
            return Err(ErrorType::Validation.err(format!(
                "Amount must be greater than 0, got {}",
                self.amount
            )));
        }
        if !self.amount.is_valid_entry() {
            return Err(ErrorType::Validation.err(format!(
                "Amount must be at most {}, got {}",
                Amount::MAX_ENTRY,
                self.amount
            )));
        }
        if self.category_id.trim().is_empty() {
            return Err(ErrorType::Validation.err("A category is required"));
        }
        if !categories.contains(&self.category_id) {
            return Err(ErrorType::Validation.err(format!(
                "Unknown category '{}'",
                self.category_id
            )));
        }
        Ok(())
    }
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("Invalid date '{}', expected YYYY-MM-DD: {e}", s.trim()))
}
