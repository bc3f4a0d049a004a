//! Core category domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, auth::UserID, money::Money};

/// Database identifier for a category.
pub type CategoryId = i64;

/// The most categories a single user may have.
pub const MAX_CATEGORIES_PER_USER: usize = 20;

/// The maximum number of characters in names and titles.
pub const MAX_NAME_LENGTH: usize = 255;

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyCategoryName] if `name` is blank and
    /// [Error::TextTooLong] if it is longer than [MAX_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else if name.chars().count() > MAX_NAME_LENGTH {
            Err(Error::TextTooLong {
                field: "name",
                max_length: MAX_NAME_LENGTH,
            })
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A display color in the form `#RRGGBB`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct HexColor(String);

impl HexColor {
    /// Parse a hex color, adding the leading `#` if it was left off.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidHexColor] if the color is not six hex digits.
    pub fn new(color: &str) -> Result<Self, Error> {
        let trimmed = color.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(format!("#{digits}")))
        } else {
            Err(Error::InvalidHexColor(color.to_owned()))
        }
    }

    /// Create a color from a value that was previously validated.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_string())
    }
}

impl AsRef<str> for HexColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Transaction counts and sums for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotals {
    /// The number of transactions in the category.
    pub transactions_count: i64,
    /// The number of income transactions in the category.
    pub income_count: i64,
    /// The number of expense transactions in the category.
    pub expense_count: i64,
    /// The sum of the income transactions in the category.
    pub total_income: Money,
    /// The sum of the expense transactions in the category.
    pub total_expense: Money,
    /// Income minus expense.
    pub total_balance: Money,
}

/// A user-owned label for grouping transactions (e.g., 'Groceries', 'Salary').
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The name of the category.
    pub name: CategoryName,
    /// An optional description.
    pub description: Option<String>,
    /// The display color, e.g. "#FF0000".
    pub hex_color: Option<HexColor>,
    /// The user that owns the category.
    pub user_id: UserID,
    /// When the category was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the category was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Counts and sums of the category's transactions.
    #[serde(flatten)]
    pub totals: CategoryTotals,
}

/// The fields of a category needed to show which category a transaction or budget belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    /// The ID of the category.
    pub id: CategoryId,
    /// The name of the category.
    pub name: String,
    /// The display color, e.g. "#FF0000".
    pub hex_color: Option<String>,
}

/// A validated category ready to be written to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    /// The name of the category.
    pub name: CategoryName,
    /// An optional description.
    pub description: Option<String>,
    /// The display color, e.g. "#FF0000".
    pub hex_color: Option<HexColor>,
}

/// The JSON body for creating or replacing a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryForm {
    /// The name of the category.
    pub name: String,
    /// An optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// The display color, e.g. "#FF0000".
    #[serde(default)]
    pub hex_color: Option<String>,
}

impl TryFrom<CategoryForm> for NewCategory {
    type Error = Error;

    fn try_from(form: CategoryForm) -> Result<Self, Self::Error> {
        let name = CategoryName::new(&form.name)?;
        let hex_color = form
            .hex_color
            .as_deref()
            .filter(|color| !color.trim().is_empty())
            .map(HexColor::new)
            .transpose()?;
        let description = form
            .description
            .map(|description| description.trim().to_owned())
            .filter(|description| !description.is_empty());

        Ok(Self {
            name,
            description,
            hex_color,
        })
    }
}
