//! The route handler for logging out.

use axum::http::StatusCode;
use axum_extra::extract::PrivateCookieJar;

use crate::auth::invalidate_auth_cookie;

/// Invalidate the auth cookie, logging the user out.
pub async fn post_log_out(jar: PrivateCookieJar) -> (PrivateCookieJar, StatusCode) {
    (invalidate_auth_cookie(jar), StatusCode::NO_CONTENT)
}
