//! Route handlers for creating, listing, reading, replacing and deleting budgets.

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{Budget, BudgetForm, BudgetId, NewBudget},
    extract::{ApiJson, ApiPath, ApiQuery},
    stores::{BudgetQuery, BudgetStore},
};

/// The state needed by the budget handlers.
#[derive(Debug, Clone)]
pub struct BudgetState<B> {
    /// The store for managing the user's budgets.
    pub budget_store: B,
}

impl<C, T, B> FromRef<AppState<C, T, B>> for BudgetState<B>
where
    B: Clone,
{
    fn from_ref(state: &AppState<C, T, B>) -> Self {
        Self {
            budget_store: state.budget_store.clone(),
        }
    }
}

/// The query string accepted when listing budgets.
#[derive(Debug, Default, Deserialize)]
pub struct BudgetListParams {
    /// Only include budgets created in this month (1-12).
    pub month: Option<u8>,
    /// Only include budgets created in this year.
    pub year: Option<i32>,
}

impl TryFrom<BudgetListParams> for BudgetQuery {
    type Error = Error;

    fn try_from(params: BudgetListParams) -> Result<Self, Self::Error> {
        match params.month {
            Some(month) if !(1..=12).contains(&month) => Err(Error::InvalidMonth(month)),
            month => Ok(Self {
                month,
                year: params.year,
            }),
        }
    }
}

/// Create a budget, responding with 201 and the new budget.
///
/// # Errors
///
/// Responds with 400 if the limit is not positive, the category is not one of
/// the user's, the category already has a budget or the user already has an
/// all-categories budget.
pub async fn create_budget<B>(
    State(state): State<BudgetState<B>>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<BudgetForm>,
) -> Result<(StatusCode, Json<Budget>), Error>
where
    B: BudgetStore,
{
    let new_budget = NewBudget::try_from(form)?;
    let budget = state.budget_store.create(new_budget, user_id)?;
    tracing::debug!("User {user_id} created budget {}", budget.id);

    Ok((StatusCode::CREATED, Json(budget)))
}

/// List the user's budgets, optionally only those created in `month` and/or `year`.
pub async fn get_budgets<B>(
    State(state): State<BudgetState<B>>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(params): ApiQuery<BudgetListParams>,
) -> Result<Json<Vec<Budget>>, Error>
where
    B: BudgetStore,
{
    let query = BudgetQuery::try_from(params)?;

    state.budget_store.get_query(query, user_id).map(Json)
}

/// Get one of the logged in user's budgets.
pub async fn get_budget<B>(
    State(state): State<BudgetState<B>>,
    Extension(user_id): Extension<UserID>,
    ApiPath(budget_id): ApiPath<BudgetId>,
) -> Result<Json<Budget>, Error>
where
    B: BudgetStore,
{
    state.budget_store.get(budget_id, user_id).map(Json)
}

/// Replace one of the logged in user's budgets.
///
/// # Errors
///
/// Responds with 400 if the body is invalid, and 404 if the budget does not
/// exist or belongs to another user.
pub async fn update_budget<B>(
    State(state): State<BudgetState<B>>,
    Extension(user_id): Extension<UserID>,
    ApiPath(budget_id): ApiPath<BudgetId>,
    ApiJson(form): ApiJson<BudgetForm>,
) -> Result<Json<Budget>, Error>
where
    B: BudgetStore,
{
    let budget = NewBudget::try_from(form)?;

    state.budget_store.update(budget_id, budget, user_id).map(Json)
}

/// Delete one of the logged in user's budgets.
pub async fn delete_budget<B>(
    State(state): State<BudgetState<B>>,
    Extension(user_id): Extension<UserID>,
    ApiPath(budget_id): ApiPath<BudgetId>,
) -> Result<StatusCode, Error>
where
    B: BudgetStore,
{
    state.budget_store.delete(budget_id, user_id)?;
    tracing::debug!("User {user_id} deleted budget {budget_id}");

    Ok(StatusCode::NO_CONTENT)
}
