//! Upload API tests.
//!
//! These tests require a running PostgreSQL database.
//! Set DATABASE_URL before running.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::Value;

use common::fixtures;
use common::TestContext;

fn upload_form(filename: &str, bytes: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part("file", Part::bytes(bytes.to_vec()).file_name(filename))
}

/// Test non-xlsx uploads are rejected.
#[tokio::test]
#[ignore = "requires database"]
async fn test_upload_rejects_other_file_types() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/upload")
        .multipart(upload_form("words.csv", b"word,group_name\nterse,A\n"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "bad_request");
}

/// Test a corrupt workbook is a parse error.
#[tokio::test]
#[ignore = "requires database"]
async fn test_upload_rejects_corrupt_workbook() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/upload")
        .multipart(upload_form("words.xlsx", b"not a workbook"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "parse_error");
}

/// Test a form without a file part.
#[tokio::test]
#[ignore = "requires database"]
async fn test_upload_requires_file_part() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/upload")
        .multipart(MultipartForm::new().add_text("note", "no file here"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

/// Test a non-multipart body gets a JSON error body.
#[tokio::test]
#[ignore = "requires database"]
async fn test_upload_requires_multipart() {
    let ctx = TestContext::new().await;
    let server = TestServer::new(ctx.router()).unwrap();

    let response = server
        .post("/api/upload")
        .json(&serde_json::json!({ "file": "words.xlsx" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "bad_request");
}

/// Test importing a workbook end to end.
#[tokio::test]
#[ignore = "requires database"]
async fn test_upload_imports_workbook() {
    let known = fixtures::unique_word("imported");
    let unknown = fixtures::unique_word("undefined");
    let ctx = TestContext::with_dictionary(vec![known.clone()]).await;
    let server = TestServer::new(ctx.router()).unwrap();
    let shouted = known.to_uppercase();
    let workbook = fixtures::workbook(
        &["Word", " Group_Name "],
        &[
            &[shouted.as_str(), "1.0"],
            &[unknown.as_str(), "Week 2"],
            &[known.as_str(), "1"],
            &["", "Week 2"],
        ],
    );

    let response = server
        .post("/api/upload")
        .multipart(upload_form("words.xlsx", &workbook))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("words.xlsx"));
    assert_eq!(
        body["stats"],
        serde_json::json!({ "processed": 1, "skipped": 1, "updated": 0, "failed": 1 })
    );
    assert_eq!(body["failed_words"], serde_json::json!([unknown]));

    let words: Value = server
        .get("/api/words")
        .add_query_param("search", &known)
        .await
        .json();
    assert_eq!(words[0]["word"], known.as_str());
    assert_eq!(words[0]["group"], "1");
    assert_eq!(words[0]["meaning"], fixtures::refreshed_meaning(&known));

    let words: Value = server
        .get("/api/words")
        .add_query_param("search", &unknown)
        .await
        .json();
    assert_eq!(words[0]["group"], "Week 2");
    assert_eq!(words[0]["meaning"], Value::Null);

    // Importing the same file again changes nothing.
    let body: Value = server
        .post("/api/upload")
        .multipart(upload_form("words.xlsx", &workbook))
        .await
        .json();
    assert_eq!(body["stats"]["skipped"], 3);
    assert_eq!(body["stats"]["processed"], 0);

    let mut ids = ctx.word_ids_matching(&known).await;
    ids.extend(ctx.word_ids_matching(&unknown).await);
    ctx.cleanup_words(&ids).await;
}
