//! A read-only summary of a user's transactions.

mod aggregation;
mod handlers;

pub use aggregation::{CategoryExpense, MonthlyTotals, Totals};
pub use handlers::{
    DEFAULT_MONTHS_SPAN, Dashboard, DashboardParams, DashboardState, RECENT_TRANSACTIONS_COUNT,
    get_dashboard,
};
