//! Defines the budget store trait.

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetId, NewBudget},
};

/// Creates, retrieves, updates and deletes a user's budgets.
///
/// Every operation is scoped to `user_id`: a budget owned by another user
/// behaves as if it does not exist.
pub trait BudgetStore {
    /// Create a new budget for `user_id`.
    ///
    /// Implementers must return [Error::InvalidCategory] if the budget's category
    /// does not belong to the user and [Error::DuplicateTotalBudget] if the
    /// budget has no category and the user already has a budget without one.
    fn create(&self, budget: NewBudget, user_id: UserID) -> Result<Budget, Error>;

    /// Get one of the user's budgets.
    fn get(&self, budget_id: BudgetId, user_id: UserID) -> Result<Budget, Error>;

    /// Get the user's budgets that match `query`, ordered by name.
    fn get_query(&self, query: BudgetQuery, user_id: UserID) -> Result<Vec<Budget>, Error>;

    /// Replace the fields of one of the user's budgets.
    ///
    /// A budget may keep being the user's all-categories budget.
    fn update(
        &self,
        budget_id: BudgetId,
        budget: NewBudget,
        user_id: UserID,
    ) -> Result<Budget, Error>;

    /// Delete one of the user's budgets.
    fn delete(&self, budget_id: BudgetId, user_id: UserID) -> Result<(), Error>;
}

/// Restricts [BudgetStore::get_query] to budgets created in a given month and/or year.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BudgetQuery {
    /// The month number, 1 to 12.
    pub month: Option<u8>,
    /// Only include budgets created in this year.
    pub year: Option<i32>,
}
