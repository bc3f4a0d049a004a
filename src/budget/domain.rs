//! Core budget domain types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    category::{CategoryId, CategorySummary, MAX_NAME_LENGTH},
    money::Money,
};

/// Database identifier for a budget.
pub type BudgetId = i64;

/// A validated, non-empty budget name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct BudgetName(String);

impl BudgetName {
    /// Create a budget name.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyBudgetName] if `name` is blank and
    /// [Error::TextTooLong] if it is longer than [MAX_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyBudgetName)
        } else if name.chars().count() > MAX_NAME_LENGTH {
            Err(Error::TextTooLong {
                field: "name",
                max_length: MAX_NAME_LENGTH,
            })
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a budget name without validation.
    ///
    /// The caller should ensure that the name is not empty and not too long.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for BudgetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether a budget limits spending in one category or across all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetType {
    /// Limits spending in one category.
    Category,
    /// Limits spending across all categories.
    Total,
}

impl BudgetType {
    /// The type of a budget with the given category reference.
    pub fn for_category(category_id: Option<CategoryId>) -> Self {
        match category_id {
            Some(_) => BudgetType::Category,
            None => BudgetType::Total,
        }
    }
}

/// A spending ceiling for a user.
///
/// A budget without a category covers all of the user's categories, and a user
/// has at most one of those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The name of the budget.
    pub name: BudgetName,
    /// The most that should be spent.
    pub amount_limit: Money,
    /// The user that owns the budget.
    pub user_id: UserID,
    /// The category the budget is for, `None` for an all-categories budget.
    pub category_id: Option<CategoryId>,
    /// The name and color of `category_id`, if set.
    pub category: Option<CategorySummary>,
    /// `category` or `total`, depending on `category_id`.
    pub budget_type: BudgetType,
    /// When the budget was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the budget was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A validated budget ready to be written to a store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The name of the budget.
    pub name: BudgetName,
    /// The most that should be spent.
    pub amount_limit: Money,
    /// `None` for an all-categories budget.
    pub category_id: Option<CategoryId>,
}

/// The JSON body for creating or replacing a budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetForm {
    /// The name of the budget.
    pub name: String,
    /// Must be at least 0.01.
    pub amount_limit: Money,
    /// The category to budget for, omit for an all-categories budget.
    #[serde(default, alias = "category")]
    pub category_id: Option<CategoryId>,
}

impl TryFrom<BudgetForm> for NewBudget {
    type Error = Error;

    fn try_from(form: BudgetForm) -> Result<Self, Self::Error> {
        if !form.amount_limit.is_positive() {
            return Err(Error::NonPositiveAmount);
        }

        Ok(Self {
            name: BudgetName::new(&form.name)?,
            amount_limit: form.amount_limit,
            category_id: form.category_id,
        })
    }
}

#[cfg(test)]
mod budget_domain_tests {
    use serde_json::json;

    use crate::{Error, money::Money};

    use super::{BudgetForm, BudgetName, BudgetType, NewBudget};

    #[test]
    fn budget_type_follows_category() {
        assert_eq!(BudgetType::for_category(Some(3)), BudgetType::Category);
        assert_eq!(BudgetType::for_category(None), BudgetType::Total);
    }

    #[test]
    fn budget_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(BudgetType::Total).unwrap(),
            json!("total")
        );
    }

    #[test]
    fn form_without_category_is_total_budget() {
        let form: BudgetForm = serde_json::from_value(json!({
            "name": "Everything",
            "amount_limit": "1500.00",
        }))
        .unwrap();

        let budget = NewBudget::try_from(form).unwrap();

        assert_eq!(budget.category_id, None);
        assert_eq!(budget.amount_limit, Money::from_cents(150_000));
    }

    #[test]
    fn zero_limit_is_rejected() {
        let form: BudgetForm = serde_json::from_value(json!({
            "name": "Everything",
            "amount_limit": 0,
        }))
        .unwrap();

        assert_eq!(NewBudget::try_from(form), Err(Error::NonPositiveAmount));
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(BudgetName::new(" "), Err(Error::EmptyBudgetName));
    }
}
