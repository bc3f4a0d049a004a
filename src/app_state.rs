//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::auth::DEFAULT_COOKIE_DURATION;

/// The state of the REST server.
///
/// `C`, `T` and `B` are the category, transaction and budget stores. Route
/// handlers only see the part of the state they need through [FromRef].
#[derive(Debug, Clone)]
pub struct AppState<C, T, B> {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,

    /// The database connection, used for user accounts.
    pub db_connection: Arc<Mutex<Connection>>,

    /// The store for categories.
    pub category_store: C,

    /// The store for transactions.
    pub transaction_store: T,

    /// The store for budgets.
    pub budget_store: B,
}

impl<C, T, B> AppState<C, T, B> {
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    pub fn new(
        cookie_secret: &str,
        local_timezone: &str,
        db_connection: Arc<Mutex<Connection>>,
        category_store: C,
        transaction_store: T,
        budget_store: B,
    ) -> Self {
        Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            db_connection,
            category_store,
            transaction_store,
            budget_store,
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl<C, T, B> FromRef<AppState<C, T, B>> for Key {
    fn from_ref(state: &AppState<C, T, B>) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
