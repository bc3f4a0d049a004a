//! The route handler for registering a new user.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{PasswordHash, UserID, ValidatedPassword, create_user},
    db::lock_connection,
    extract::ApiJson,
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for storing users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl<C, T, B> FromRef<AppState<C, T, B>> for RegistrationState {
    fn from_ref(state: &AppState<C, T, B>) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The data needed to register a user.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    /// The user's email address.
    pub email: String,
    /// The password, which must be rated strong.
    pub password: String,
    /// Must equal `password`.
    pub confirm_password: String,
}

/// The public details of a newly registered user.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RegisteredUser {
    /// The ID of the user.
    pub id: UserID,
    /// The user's email address.
    pub email: String,
}

/// Register a new user.
///
/// # Errors
///
/// Returns a client error if the email is invalid or already in use, the
/// passwords differ, or the password is too weak.
pub async fn register_user(
    State(state): State<RegistrationState>,
    ApiJson(form): ApiJson<RegisterForm>,
) -> Result<(StatusCode, Json<RegisteredUser>), Error> {
    let email = EmailAddress::from_str(form.email.trim())
        .map_err(|error| Error::InvalidEmail(error.to_string()))?;

    if form.password != form.confirm_password {
        return Err(Error::PasswordsDoNotMatch);
    }

    let password = ValidatedPassword::new(&form.password)?;
    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)?;

    let connection = lock_connection(&state.db_connection)?;
    let user = create_user(email, password_hash, &connection)?;
    tracing::info!("Registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        Json(RegisteredUser {
            id: user.id,
            email: user.email.to_string(),
        }),
    ))
}

#[cfg(test)]
mod register_user_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{Error, db::initialize, error::ErrorBody};

    use super::{RegisteredUser, RegistrationState, register_user};

    const STRONG_PASSWORD: &str = "fK9#mQ2$vL7@xR4!";

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let state = RegistrationState {
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route("/users", post(register_user))
            .with_state(state);

        TestServer::try_new(app).unwrap()
    }

    #[tokio::test]
    async fn register_succeeds() {
        let server = get_test_server();

        let response = server
            .post("/users")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": STRONG_PASSWORD,
                "confirm_password": STRONG_PASSWORD,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let user: RegisteredUser = response.json();
        assert_eq!(user.email, "foo@bar.baz");
    }

    #[tokio::test]
    async fn register_fails_on_mismatched_passwords() {
        let server = get_test_server();

        let response = server
            .post("/users")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": STRONG_PASSWORD,
                "confirm_password": "somethingelse",
            }))
            .await;

        response.assert_status_bad_request();
        let body: ErrorBody = response.json();
        assert_eq!(body.error, Error::PasswordsDoNotMatch.to_string());
    }

    #[tokio::test]
    async fn register_fails_on_weak_password() {
        let server = get_test_server();

        let response = server
            .post("/users")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "password",
                "confirm_password": "password",
            }))
            .await;

        response.assert_status_bad_request();
        let body: ErrorBody = response.json();
        assert!(body.error.starts_with("password is too weak"));
    }

    #[tokio::test]
    async fn register_fails_on_invalid_email() {
        let server = get_test_server();

        let response = server
            .post("/users")
            .json(&json!({
                "email": "not an email",
                "password": STRONG_PASSWORD,
                "confirm_password": STRONG_PASSWORD,
            }))
            .await;

        response.assert_status_bad_request();
    }
}
