//! The route handler for log-in requests.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Json,
    extract::{FromRef, State},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use email_address::EmailAddress;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_email, set_auth_cookie},
    db::lock_connection,
    extract::ApiJson,
    timezone::get_local_offset,
};

/// How long the auth cookie should last if the user selects "remember me" at log-in.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// The state needed to perform a login.
#[derive(Debug, Clone)]
pub struct LogInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
    /// The database connection for looking up users.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl<C, T, B> FromRef<AppState<C, T, B>> for LogInState {
    fn from_ref(state: &AppState<C, T, B>) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<LogInState> for Key {
    fn from_ref(state: &LogInState) -> Self {
        state.cookie_key.clone()
    }
}

/// The credentials sent by the client to log in.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInData {
    /// The email the user registered with.
    pub email: String,
    /// The plain text password, checked against the stored hash.
    pub password: String,
    /// Keep the user logged in for a week instead of a few minutes.
    #[serde(default)]
    pub remember_me: bool,
}

/// The body of a successful log-in response.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LogInResponse {
    /// The ID of the user that just logged in.
    pub user_id: UserID,
}

/// Handler for log-in requests via the POST method.
///
/// On success the auth cookie is set and the user's ID is returned.
///
/// # Errors
///
/// Returns [Error::InvalidCredentials] if the email is not registered or the
/// password is wrong. The same error is used for both so that clients cannot
/// find out which emails are registered.
pub async fn post_log_in(
    State(state): State<LogInState>,
    jar: PrivateCookieJar,
    ApiJson(user_data): ApiJson<LogInData>,
) -> Result<(PrivateCookieJar, Json<LogInResponse>), Error> {
    let email = EmailAddress::from_str(user_data.email.trim())
        .map_err(|_| Error::InvalidCredentials)?;

    let user = {
        let connection = lock_connection(&state.db_connection)?;

        match get_user_by_email(&email, &connection) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::InvalidCredentials),
            Err(error) => return Err(error),
        }
    };

    let is_password_valid = user
        .password_hash
        .verify(&user_data.password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    if !is_password_valid {
        return Err(Error::InvalidCredentials);
    }

    let cookie_duration = if user_data.remember_me {
        REMEMBER_ME_COOKIE_DURATION
    } else {
        state.cookie_duration
    };

    let local_offset = get_local_offset(&state.local_timezone)
        .ok_or_else(|| Error::InvalidTimezoneError(state.local_timezone.clone()))?;

    tracing::info!("User {} logged in", user.id);
    let jar = set_auth_cookie(jar, user.id, cookie_duration, local_offset)?;

    Ok((jar, Json(LogInResponse { user_id: user.id })))
}

#[cfg(test)]
mod log_in_tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{Router, routing::post};
    use axum_test::TestServer;
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use serde_json::json;
    use time::{Duration, OffsetDateTime};

    use crate::{
        Error,
        app_state::create_cookie_key,
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, PasswordHash, ValidatedPassword, create_user,
        },
        db::initialize,
        error::ErrorBody,
    };

    use super::{LogInResponse, LogInState, post_log_in};

    const PASSWORD: &str = "averysafeandsecurepassword";

    fn get_test_server() -> (TestServer, i64) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let user = create_user(
            EmailAddress::from_str("test@test.com").unwrap(),
            PasswordHash::new(ValidatedPassword::new_unchecked(PASSWORD), 4).unwrap(),
            &connection,
        )
        .unwrap();

        let state = LogInState {
            cookie_key: create_cookie_key("foobar"),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: "Etc/UTC".to_owned(),
            db_connection: Arc::new(Mutex::new(connection)),
        };
        let app = Router::new()
            .route("/log_in", post(post_log_in))
            .with_state(state);

        (TestServer::try_new(app).unwrap(), user.id.as_i64())
    }

    #[tokio::test]
    async fn log_in_succeeds_with_valid_credentials() {
        let (server, user_id) = get_test_server();

        let response = server
            .post("/log_in")
            .json(&json!({"email": "test@test.com", "password": PASSWORD}))
            .await;

        response.assert_status_ok();
        let body: LogInResponse = response.json();
        assert_eq!(body.user_id.as_i64(), user_id);
        let cookie = response.cookie(COOKIE_TOKEN);
        let expires = cookie.expires_datetime().unwrap();
        assert!((expires - (OffsetDateTime::now_utc() + DEFAULT_COOKIE_DURATION)).abs() < Duration::seconds(1));
    }

    #[tokio::test]
    async fn remember_me_extends_cookie_to_a_week() {
        let (server, _) = get_test_server();

        let response = server
            .post("/log_in")
            .json(&json!({"email": "test@test.com", "password": PASSWORD, "remember_me": true}))
            .await;

        response.assert_status_ok();
        let expires = response.cookie(COOKIE_TOKEN).expires_datetime().unwrap();
        assert!((expires - (OffsetDateTime::now_utc() + Duration::days(7))).abs() < Duration::seconds(1));
    }

    #[tokio::test]
    async fn log_in_fails_with_wrong_password() {
        let (server, _) = get_test_server();

        let response = server
            .post("/log_in")
            .json(&json!({"email": "test@test.com", "password": "wrongpassword"}))
            .await;

        response.assert_status_unauthorized();
        let body: ErrorBody = response.json();
        assert_eq!(body.error, Error::InvalidCredentials.to_string());
    }

    #[tokio::test]
    async fn log_in_fails_with_unknown_email() {
        let (server, _) = get_test_server();

        let response = server
            .post("/log_in")
            .json(&json!({"email": "nobody@test.com", "password": PASSWORD}))
            .await;

        response.assert_status_unauthorized();
        let body: ErrorBody = response.json();
        assert_eq!(body.error, Error::InvalidCredentials.to_string());
    }
}
