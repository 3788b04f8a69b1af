//! HTTP handlers

pub mod health;
pub mod quiz;
pub mod stats;
pub mod upload;
pub mod words;

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::ApiError;

/// JSON body extractor whose rejections render as [`ApiError::BadRequest`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Path extractor whose rejections render as [`ApiError::BadRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);

/// Query extractor whose rejections render as [`ApiError::BadRequest`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Deserialize)]
    struct Page {
        page: u32,
    }

    async fn echo_id(ApiPath(id): ApiPath<i64>) -> Json<i64> {
        Json(id)
    }

    async fn echo_page(ApiQuery(query): ApiQuery<Page>) -> Json<u32> {
        Json(query.page)
    }

    fn server() -> TestServer {
        let app = Router::new()
            .route("/items/:id", get(echo_id))
            .route("/pages", get(echo_page));
        TestServer::new(app).unwrap()
    }

    #[tokio::test]
    async fn bad_path_is_a_json_bad_request() {
        let response = server().get("/items/abc").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "bad_request");
        assert!(body["message"].as_str().unwrap().contains("abc"));
    }

    #[tokio::test]
    async fn bad_query_is_a_json_bad_request() {
        let response = server().get("/pages").add_query_param("page", "first").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn valid_parts_pass_through() {
        let id: i64 = server().get("/items/42").await.json();
        assert_eq!(id, 42);
        let page: u32 = server().get("/pages").add_query_param("page", 3).await.json();
        assert_eq!(page, 3);
    }
}
