//! Extractors that report rejections with the application's JSON error body.

use axum::extract::{
    FromRequest, FromRequestParts,
    rejection::{JsonRejection, PathRejection, QueryRejection},
};

use crate::Error;

/// Like [axum::Json], but a malformed body is rejected with [Error::InvalidRequest].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct ApiJson<T>(pub T);

/// Like [axum::extract::Query], but a malformed query string is rejected with [Error::InvalidRequest].
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct ApiQuery<T>(pub T);

/// Like [axum::extract::Path], but a malformed path parameter is reported as not found.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct ApiPath<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path parameter: {}", rejection.body_text());
        Error::NotFound
    }
}

#[cfg(test)]
mod extract_tests {
    use axum::{Json, Router, routing::post};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::json;

    use crate::error::ErrorBody;

    use super::{ApiJson, ApiQuery};

    #[derive(Deserialize)]
    struct Body {
        name: String,
    }

    #[derive(Deserialize)]
    struct Params {
        count: u32,
    }

    async fn echo(ApiQuery(params): ApiQuery<Params>, ApiJson(body): ApiJson<Body>) -> Json<String> {
        Json(format!("{} {}", body.name, params.count))
    }

    fn get_test_server() -> TestServer {
        TestServer::try_new(Router::new().route("/echo", post(echo))).unwrap()
    }

    #[tokio::test]
    async fn valid_request_is_extracted() {
        let response = get_test_server()
            .post("/echo")
            .add_query_param("count", 3)
            .json(&json!({"name": "foo"}))
            .await;

        response.assert_status_ok();
        response.assert_json(&"foo 3".to_string());
    }

    #[tokio::test]
    async fn malformed_json_is_a_json_bad_request() {
        let response = get_test_server()
            .post("/echo")
            .add_query_param("count", 3)
            .json(&json!({"title": "foo"}))
            .await;

        response.assert_status_bad_request();
        let body: ErrorBody = response.json();
        assert!(body.error.starts_with("invalid request"));
    }

    #[tokio::test]
    async fn malformed_query_is_a_json_bad_request() {
        let response = get_test_server()
            .post("/echo")
            .add_query_param("count", "many")
            .json(&json!({"name": "foo"}))
            .await;

        response.assert_status_bad_request();
        let body: ErrorBody = response.json();
        assert!(body.error.starts_with("invalid request"));
    }
}
