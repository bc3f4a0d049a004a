//! Spending ceilings, either for one category or across all of a user's categories.

mod domain;
mod handlers;

pub use domain::{Budget, BudgetForm, BudgetId, BudgetName, BudgetType, NewBudget};
pub use handlers::{
    BudgetListParams, BudgetState, create_budget, delete_budget, get_budget, get_budgets,
    update_budget,
};
