//! Traits for the repositories ("stores") that persist categories, transactions
//! and budgets, and their SQLite implementations.

mod budget;
mod category;
mod transaction;

/// SQLite implementations of the stores.
pub mod sqlite;

pub use budget::{BudgetQuery, BudgetStore};
pub use category::CategoryStore;
pub use transaction::{TransactionQuery, TransactionStore};
