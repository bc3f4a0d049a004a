//! Core transaction domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    Error,
    auth::UserID,
    category::{CategoryId, CategorySummary, MAX_NAME_LENGTH},
    money::Money,
};

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// Dates are exchanged with clients as `YYYY-MM-DD`.
pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Parse a `YYYY-MM-DD` date from a query string or similar.
///
/// # Errors
///
/// Returns [Error::InvalidDate] if `text` is not a valid date.
pub fn parse_date(text: &str) -> Result<Date, Error> {
    Date::parse(text.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate(text.to_owned()))
}

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received.
    Income,
    /// Money spent.
    #[default]
    Expense,
}

impl TransactionType {
    /// The value stored in the database and sent to clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(Error::InvalidRequest(format!(
                "unknown transaction type \"{other}\", expected \"income\" or \"expense\""
            ))),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, non-empty transaction title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct TransactionTitle(String);

impl TransactionTitle {
    /// Create a transaction title.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyTransactionTitle] if `title` is blank and
    /// [Error::TextTooLong] if it is longer than [MAX_NAME_LENGTH] characters.
    pub fn new(title: &str) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            Err(Error::EmptyTransactionTitle)
        } else if title.chars().count() > MAX_NAME_LENGTH {
            Err(Error::TextTooLong {
                field: "title",
                max_length: MAX_NAME_LENGTH,
            })
        } else {
            Ok(Self(title.to_string()))
        }
    }

    /// Create a title without validation.
    pub fn new_unchecked(title: &str) -> Self {
        Self(title.to_string())
    }
}

impl AsRef<str> for TransactionTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The amount with a sign showing its direction, e.g. "-100.00" or "+200.00".
pub fn format_amount(transaction_type: TransactionType, amount: Money) -> String {
    match transaction_type {
        TransactionType::Income => format!("+{amount}"),
        TransactionType::Expense => format!("-{amount}"),
    }
}

/// A dated income or expense event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A short description of the transaction.
    pub title: TransactionTitle,
    /// An optional description.
    pub description: Option<String>,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Always positive, the direction is given by `transaction_type`.
    pub amount: Money,
    /// The amount with a `+` for income or `-` for expense.
    pub formatted_amount: String,
    /// The day the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// The category the transaction belongs to, if any.
    pub category_id: Option<CategoryId>,
    /// The name and color of `category_id`, if set.
    pub category: Option<CategorySummary>,
    /// When the transaction was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A validated transaction ready to be written to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// A short description of the transaction.
    pub title: TransactionTitle,
    /// An optional description.
    pub description: Option<String>,
    /// Whether the transaction is income or an expense.
    pub transaction_type: TransactionType,
    /// Always positive, `transaction_type` gives the direction.
    pub amount: Money,
    /// The day the transaction happened.
    pub date: Date,
    /// The category the transaction belongs to, if any.
    pub category_id: Option<CategoryId>,
}

/// The JSON body for creating or replacing a transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionForm {
    /// A short description of the transaction.
    pub title: String,
    /// An optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the transaction is income or an expense.
    #[serde(rename = "type", default)]
    pub transaction_type: TransactionType,
    /// The amount of the transaction.
    pub amount: Money,
    /// The day the transaction happened.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// The category the transaction belongs to, if any.
    #[serde(default, alias = "category")]
    pub category_id: Option<CategoryId>,
}

impl TryFrom<TransactionForm> for NewTransaction {
    type Error = Error;

    /// Validate the fields that do not need the database.
    ///
    /// Category ownership is checked by the store.
    fn try_from(form: TransactionForm) -> Result<Self, Self::Error> {
        if !form.amount.is_positive() {
            return Err(Error::NonPositiveAmount);
        }

        Ok(Self {
            title: TransactionTitle::new(&form.title)?,
            description: form
                .description
                .map(|description| description.trim().to_owned())
                .filter(|description| !description.is_empty()),
            transaction_type: form.transaction_type,
            amount: form.amount,
            date: form.date,
            category_id: form.category_id,
        })
    }
}
