//! The URIs of the JSON API.
//!
//! For endpoints that take a parameter, e.g., '/categories/{category_id}/', use [format_endpoint].

/// The route to request a cup of coffee.
pub const COFFEE: &str = "/coffee/";
/// The route for registering a new user.
pub const USERS: &str = "/users/";
/// The route for logging in a user.
pub const LOG_IN: &str = "/log_in/";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/log_out/";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/categories/";
/// The route to get, replace and delete a single category.
pub const CATEGORY: &str = "/categories/{category_id}/";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/transactions/";
/// The route to get, replace and delete a single transaction.
pub const TRANSACTION: &str = "/transactions/{transaction_id}/";
/// The route for the summary of a user's transactions.
pub const DASHBOARD: &str = "/transactions/dashboard/";

/// The route to list and create budgets.
pub const BUDGETS: &str = "/budgets/";
/// The route to get, replace and delete a single budget.
pub const BUDGET: &str = "/budgets/{budget_id}/";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is the first substring that starts with `{` and ends with `}`,
/// e.g. '{category_id}' in '/categories/{category_id}/'.
///
/// If no parameter is found in `endpoint_path`, the original path is returned.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let end = endpoint_path[start..]
        .find('}')
        .map(|offset| start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!("{}{id}{}", &endpoint_path[..start], &endpoint_path[end..])
}
