//! Route handlers for creating, listing, reading, replacing and deleting transactions.

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    category::CategoryId,
    extract::{ApiJson, ApiPath, ApiQuery},
    stores::{TransactionQuery, TransactionStore},
    transaction::{
        NewTransaction, Transaction, TransactionForm, TransactionId, TransactionType, parse_date,
    },
};

/// The state needed by the transaction handlers.
#[derive(Debug, Clone)]
pub struct TransactionState<T> {
    /// The store for reading and writing transactions.
    pub transaction_store: T,
}

impl<C, T, B> FromRef<AppState<C, T, B>> for TransactionState<T>
where
    T: Clone,
{
    fn from_ref(state: &AppState<C, T, B>) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
        }
    }
}

/// The query string accepted when listing transactions.
///
/// Dates are kept as strings so that a bad date gets a specific error message.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionListParams {
    /// Text to look for in the title or description.
    pub search: Option<String>,
    /// Only include `income` or `expense` transactions.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
    /// The earliest date to include, as `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// The latest date to include, as `YYYY-MM-DD`.
    pub date_to: Option<String>,
    /// The most transactions to return.
    pub limit: Option<u32>,
}

impl TryFrom<TransactionListParams> for TransactionQuery {
    type Error = Error;

    fn try_from(params: TransactionListParams) -> Result<Self, Self::Error> {
        let non_empty = |value: Option<String>| value.filter(|value| !value.trim().is_empty());

        Ok(Self {
            search: non_empty(params.search),
            transaction_type: non_empty(params.transaction_type)
                .map(|value| value.trim().parse::<TransactionType>())
                .transpose()?,
            category_id: params.category_id,
            date_from: non_empty(params.date_from)
                .map(|date| parse_date(&date))
                .transpose()?,
            date_to: non_empty(params.date_to)
                .map(|date| parse_date(&date))
                .transpose()?,
            limit: params.limit,
        })
    }
}

/// Create a transaction, responding with 201 and the new transaction.
///
/// # Errors
///
/// Responds with 400 if the amount is not positive, the title is blank or the
/// category is not one of the user's.
pub async fn create_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserID>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<(StatusCode, Json<Transaction>), Error>
where
    T: TransactionStore,
{
    let new_transaction = NewTransaction::try_from(form)?;
    let transaction = state.transaction_store.create(new_transaction, user_id)?;
    tracing::debug!("User {user_id} created transaction {}", transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// List the logged in user's transactions, newest first.
pub async fn get_transactions<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(params): ApiQuery<TransactionListParams>,
) -> Result<Json<Vec<Transaction>>, Error>
where
    T: TransactionStore,
{
    let query = TransactionQuery::try_from(params)?;

    state.transaction_store.get_query(query, user_id).map(Json)
}

/// Get one of the logged in user's transactions.
pub async fn get_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserID>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
) -> Result<Json<Transaction>, Error>
where
    T: TransactionStore,
{
    state.transaction_store.get(transaction_id, user_id).map(Json)
}

/// Replace every field of a transaction.
pub async fn update_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserID>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
    ApiJson(form): ApiJson<TransactionForm>,
) -> Result<Json<Transaction>, Error>
where
    T: TransactionStore,
{
    let transaction = NewTransaction::try_from(form)?;

    state
        .transaction_store
        .update(transaction_id, transaction, user_id)
        .map(Json)
}

/// Delete one of the logged in user's transactions.
pub async fn delete_transaction<T>(
    State(state): State<TransactionState<T>>,
    Extension(user_id): Extension<UserID>,
    ApiPath(transaction_id): ApiPath<TransactionId>,
) -> Result<StatusCode, Error>
where
    T: TransactionStore,
{
    state.transaction_store.delete(transaction_id, user_id)?;
    tracing::debug!("User {user_id} deleted transaction {transaction_id}");

    Ok(StatusCode::NO_CONTENT)
}
