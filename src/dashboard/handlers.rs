//! The dashboard route handler.

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::UserID,
    dashboard::aggregation::{
        CategoryExpense, MonthlyTotals, calculate_totals, expenses_by_category,
        monthly_income_vs_expenses, window_start,
    },
    extract::ApiQuery,
    money::Money,
    stores::{TransactionQuery, TransactionStore},
    timezone::get_local_offset,
    transaction::Transaction,
};

/// The window used for the monthly series when the client does not give one.
pub const DEFAULT_MONTHS_SPAN: u32 = 4;

/// How many of the newest transactions are included in the dashboard.
pub const RECENT_TRANSACTIONS_COUNT: usize = 10;

/// The state needed for building the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardState<T> {
    /// The store for reading and writing transactions.
    pub transaction_store: T,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl<C, T, B> FromRef<AppState<C, T, B>> for DashboardState<T>
where
    T: Clone,
{
    fn from_ref(state: &AppState<C, T, B>) -> Self {
        Self {
            transaction_store: state.transaction_store.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The query string for the dashboard.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    /// The number of calendar months, up to and including the current one, in
    /// the monthly series.
    pub months_span: Option<u32>,
}

/// A summary of a user's transactions.
///
/// The totals and category breakdown cover every transaction, while the
/// monthly series only covers the last `months_span` months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dashboard {
    /// Total income over all transactions.
    pub income: Money,
    /// Total expense over all transactions.
    pub expense: Money,
    /// Income minus expense.
    pub balance: Money,
    /// Expenses per category, largest first.
    pub categories: Vec<CategoryExpense>,
    /// Income and expense per month in the window, newest first.
    pub income_vs_expenses: Vec<MonthlyTotals>,
    /// The newest transactions.
    pub recent_transactions: Vec<Transaction>,
    /// The number of months in the monthly series.
    pub months_span: u32,
}

/// Summarise the logged in user's transactions.
///
/// # Errors
///
/// Responds with 400 if `months_span` is zero. Any failure while building the
/// dashboard is reported as [Error::DashboardFailed].
pub async fn get_dashboard<T>(
    State(state): State<DashboardState<T>>,
    Extension(user_id): Extension<UserID>,
    ApiQuery(params): ApiQuery<DashboardParams>,
) -> Result<Json<Dashboard>, Error>
where
    T: TransactionStore,
{
    let months_span = params.months_span.unwrap_or(DEFAULT_MONTHS_SPAN);

    if months_span == 0 {
        return Err(Error::InvalidMonthsSpan(months_span));
    }

    let today = get_local_offset(&state.local_timezone)
        .map(|offset| OffsetDateTime::now_utc().to_offset(offset).date())
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))
        .map_err(into_dashboard_error)?;

    build_dashboard(&state.transaction_store, user_id, today, months_span)
        .map(Json)
        .map_err(into_dashboard_error)
}

/// Wrap a failure while building the dashboard.
///
/// Aggregation errors already describe the problem. Anything else is logged and
/// replaced with a description of the step that failed, so that internal details
/// such as SQL error text are not sent to the client.
fn into_dashboard_error(error: Error) -> Error {
    match error {
        Error::DashboardFailed(_) => error,
        Error::InvalidTimezoneError(_) => {
            tracing::error!("Could not build the dashboard: {error}");
            Error::DashboardFailed("could not determine the current date".to_owned())
        }
        other => {
            tracing::error!("Could not build the dashboard: {other}");
            Error::DashboardFailed("could not read the transactions".to_owned())
        }
    }
}

fn build_dashboard<T>(
    transaction_store: &T,
    user_id: UserID,
    today: Date,
    months_span: u32,
) -> Result<Dashboard, Error>
where
    T: TransactionStore,
{
    // Newest first, so the recent transactions are at the front.
    let transactions = transaction_store.get_query(TransactionQuery::default(), user_id)?;

    let totals = calculate_totals(&transactions)?;
    let categories = expenses_by_category(&transactions)?;
    let income_vs_expenses =
        monthly_income_vs_expenses(&transactions, window_start(today, months_span), today)?;

    let mut recent_transactions = transactions;
    recent_transactions.truncate(RECENT_TRANSACTIONS_COUNT);

    Ok(Dashboard {
        income: totals.income,
        expense: totals.expense,
        balance: totals.balance,
        categories,
        income_vs_expenses,
        recent_transactions,
        months_span,
    })
}


#[cfg(test)]
mod dashboard_route_tests {
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use time::{Duration, OffsetDateTime, macros::format_description};

    use crate::{
        category::Category,
        endpoints,
        test_utils::{TestApp, spawn_app},
    };

    use super::{Dashboard, RECENT_TRANSACTIONS_COUNT};

    async fn create_transaction(app: &TestApp, body: Value) {
        app.post(endpoints::TRANSACTIONS)
            .json(&body)
            .await
            .assert_status(StatusCode::CREATED);
    }

    fn today() -> String {
        OffsetDateTime::now_utc()
            .date()
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap()
    }

    #[tokio::test]
    async fn totals_for_four_incomes_and_one_expense() {
        let app = spawn_app().await;
        let category: Category = app
            .post(endpoints::CATEGORIES)
            .json(&json!({ "name": "Food" }))
            .await
            .json();
        for _ in 0..4 {
            create_transaction(
                &app,
                json!({ "title": "Pay", "type": "income", "amount": "200.00", "date": today() }),
            )
            .await;
        }
        create_transaction(
            &app,
            json!({
                "title": "Lunch",
                "type": "expense",
                "amount": "50.00",
                "date": today(),
                "category_id": category.id,
            }),
        )
        .await;

        let response = app.get(endpoints::DASHBOARD).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["income"], "800.00");
        assert_eq!(body["expense"], "50.00");
        assert_eq!(body["balance"], "750.00");
        assert_eq!(body["months_span"], 4);
        assert_eq!(body["categories"][0]["name"], "Food");
        assert_eq!(body["categories"][0]["total"], "50.00");
        assert_eq!(body["income_vs_expenses"].as_array().unwrap().len(), 1);
        assert_eq!(body["income_vs_expenses"][0]["income"], "800.00");
        assert_eq!(body["income_vs_expenses"][0]["expense"], "50.00");
        assert_eq!(body["recent_transactions"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn totals_include_transactions_outside_window() {
        let app = spawn_app().await;
        let long_ago = (OffsetDateTime::now_utc() - Duration::days(800))
            .date()
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap();
        create_transaction(
            &app,
            json!({ "title": "Old pay", "type": "income", "amount": "10", "date": long_ago }),
        )
        .await;

        let dashboard: Dashboard = app
            .get(endpoints::DASHBOARD)
            .add_query_param("months_span", 1)
            .await
            .json();

        assert_eq!(dashboard.income.to_string(), "10.00");
        assert!(dashboard.income_vs_expenses.is_empty());
        assert_eq!(dashboard.months_span, 1);
    }

    #[tokio::test]
    async fn future_months_are_not_in_monthly_series() {
        let app = spawn_app().await;
        let next_year = (OffsetDateTime::now_utc() + Duration::days(400))
            .date()
            .format(format_description!("[year]-[month]-[day]"))
            .unwrap();
        create_transaction(
            &app,
            json!({ "title": "Deposit", "type": "income", "amount": "25", "date": next_year }),
        )
        .await;
        create_transaction(
            &app,
            json!({ "title": "Pay", "type": "income", "amount": "10", "date": today() }),
        )
        .await;

        let dashboard: Dashboard = app.get(endpoints::DASHBOARD).await.json();

        assert_eq!(dashboard.income.to_string(), "35.00");
        assert_eq!(dashboard.income_vs_expenses.len(), 1);
        assert_eq!(dashboard.income_vs_expenses[0].income.to_string(), "10.00");
        assert_eq!(dashboard.income_vs_expenses[0].month, today()[..7]);
    }

    #[tokio::test]
    async fn recent_transactions_are_capped() {
        let app = spawn_app().await;
        for i in 0..RECENT_TRANSACTIONS_COUNT + 2 {
            create_transaction(
                &app,
                json!({ "title": format!("Coffee {i}"), "amount": "4.50", "date": today() }),
            )
            .await;
        }

        let dashboard: Dashboard = app.get(endpoints::DASHBOARD).await.json();

        assert_eq!(dashboard.recent_transactions.len(), RECENT_TRANSACTIONS_COUNT);
        assert_eq!(
            dashboard.recent_transactions[0].title.as_ref(),
            format!("Coffee {}", RECENT_TRANSACTIONS_COUNT + 1)
        );
    }

    #[tokio::test]
    async fn zero_months_span_is_bad_request() {
        let app = spawn_app().await;

        app.get(endpoints::DASHBOARD)
            .add_query_param("months_span", 0)
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn empty_dashboard_is_all_zero() {
        let app = spawn_app().await;

        let body: Value = app.get(endpoints::DASHBOARD).await.json();

        assert_eq!(body["income"], "0.00");
        assert_eq!(body["balance"], "0.00");
        assert_eq!(body["categories"], json!([]));
        assert_eq!(body["recent_transactions"], json!([]));
    }
}
