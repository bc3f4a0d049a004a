//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};

use crate::{
    AppState, Error,
    auth::{auth_guard, post_log_in, post_log_out, register_user},
    budget::{create_budget, delete_budget, get_budget, get_budgets, update_budget},
    category::{create_category, delete_category, get_categories, get_category, update_category},
    dashboard::get_dashboard,
    endpoints,
    stores::{BudgetStore, CategoryStore, TransactionStore},
    transaction::{
        create_transaction, delete_transaction, get_transaction, get_transactions,
        update_transaction,
    },
};

/// Return a router with all the app's routes.
///
/// Every route except registration, log in, log out and coffee requires a
/// valid auth cookie.
pub fn build_router<C, T, B>(state: AppState<C, T, B>) -> Router
where
    C: CategoryStore + Clone + Send + Sync + 'static,
    T: TransactionStore + Clone + Send + Sync + 'static,
    B: BudgetStore + Clone + Send + Sync + 'static,
{
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::USERS, post(register_user))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::LOG_OUT, post(post_log_out));

    let protected_routes = Router::new()
        .route(
            endpoints::CATEGORIES,
            get(get_categories::<C>).post(create_category::<C>),
        )
        .route(
            endpoints::CATEGORY,
            get(get_category::<C>)
                .put(update_category::<C>)
                .delete(delete_category::<C>),
        )
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions::<T>).post(create_transaction::<T>),
        )
        .route(endpoints::DASHBOARD, get(get_dashboard::<T>))
        .route(
            endpoints::TRANSACTION,
            get(get_transaction::<T>)
                .put(update_transaction::<T>)
                .delete(delete_transaction::<T>),
        )
        .route(
            endpoints::BUDGETS,
            get(get_budgets::<B>).post(create_budget::<B>),
        )
        .route(
            endpoints::BUDGET,
            get(get_budget::<B>)
                .put(update_budget::<B>)
                .delete(delete_budget::<B>),
        )
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> (StatusCode, &'static str) {
    (StatusCode::IM_A_TEAPOT, "I'm a teapot")
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
