//! The application error type and how it is rendered as a JSON response.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::category::CategoryId;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an email and password combination that does not match a user.
    #[error("incorrect email or password")]
    InvalidCredentials,

    /// The auth cookie is missing, could not be decrypted or has expired.
    #[error("authentication credentials were not provided or have expired")]
    Unauthenticated,

    /// The string used to register a user is not a valid email address.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    /// The email used to register a user is already in use.
    #[error("the email is already in use")]
    DuplicateEmail,

    /// The password and the password confirmation sent at registration differ.
    #[error("the passwords do not match")]
    PasswordsDoNotMatch,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used as a transaction title.
    #[error("transaction title cannot be empty")]
    EmptyTransactionTitle,

    /// An empty string was used to create a budget name.
    #[error("budget name cannot be empty")]
    EmptyBudgetName,

    /// A text field exceeded its maximum length.
    #[error("{field} must be at most {max_length} characters long")]
    TextTooLong {
        /// The name of the offending field.
        field: &'static str,
        /// The maximum number of characters for the field.
        max_length: usize,
    },

    /// The display color is not of the form `#RRGGBB`.
    #[error("\"{0}\" is not a valid hex color, expected a value like \"#FF0000\"")]
    InvalidHexColor(String),

    /// The amount could not be parsed as a decimal with at most two decimal places.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// An amount or amount limit of zero or less was given.
    #[error("amount must be at least 0.01")]
    NonPositiveAmount,

    /// The category ID does not refer to a category owned by the requesting user.
    #[error("category {0} does not exist or belongs to another user")]
    InvalidCategory(CategoryId),

    /// The user already has the maximum number of categories.
    #[error("you cannot have more than {0} categories")]
    CategoryLimitReached(usize),

    /// The user already has a category with the same name.
    #[error("a category with this name already exists")]
    DuplicateCategoryName,

    /// The user already has a budget with the same name.
    #[error("a budget with this name already exists")]
    DuplicateBudgetName,

    /// The category already has a budget.
    #[error("this category already has a budget")]
    DuplicateCategoryBudget,

    /// The user already has a budget that covers all categories.
    #[error("you can only have one budget for all categories")]
    DuplicateTotalBudget,

    /// A date string could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date \"{0}\", expected a date like 2024-01-31")]
    InvalidDate(String),

    /// A month outside of 1-12 was used to filter budgets.
    #[error("invalid month {0}, expected a number from 1 to 12")]
    InvalidMonth(u8),

    /// The dashboard was requested with a window of zero months.
    #[error("months_span must be at least 1, got {0}")]
    InvalidMonthsSpan(u32),

    /// The request body or query string could not be parsed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested resource was not found.
    ///
    /// Resources owned by another user are also reported as not found so that
    /// clients cannot tell whether another user's resource exists.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that does not exist")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that does not exist")]
    DeleteMissingCategory,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that does not exist")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that does not exist")]
    DeleteMissingTransaction,

    /// Tried to update a budget that does not exist
    #[error("tried to update a budget that does not exist")]
    UpdateMissingBudget,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that does not exist")]
    DeleteMissingBudget,

    /// Building the dashboard failed.
    #[error("failed to build the dashboard: {0}")]
    DashboardFailed(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("category.name") =>
            {
                Error::DuplicateCategoryName
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("budget.name") =>
            {
                Error::DuplicateBudgetName
            }
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("budget.category_id") =>
            {
                Error::DuplicateCategoryBudget
            }
            // The partial index over budgets without a category reports only the user column.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("budget.user_id") =>
            {
                Error::DuplicateTotalBudget
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to clients when a request fails.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// A human readable description of what went wrong.
    pub error: String,
}

impl Error {
    /// The HTTP status code that best describes the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidCredentials | Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::NotFound
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::UpdateMissingTransaction
            | Error::DeleteMissingTransaction
            | Error::UpdateMissingBudget
            | Error::DeleteMissingBudget => StatusCode::NOT_FOUND,
            Error::HashingError(_)
            | Error::DashboardFailed(_)
            | Error::SqlError(_)
            | Error::DatabaseLockError
            | Error::InvalidTimezoneError(_)
            | Error::JSONSerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error = match self {
            Error::DashboardFailed(_) => {
                tracing::error!("{self}");
                self.to_string()
            }
            Error::InvalidTimezoneError(ref timezone) => {
                tracing::error!("{self}");
                format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                )
            }
            // Any other server errors are not intended to be shown to the client.
            error if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("An unexpected error occurred: {}", error);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}
