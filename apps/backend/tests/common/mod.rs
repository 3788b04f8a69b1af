//! Common test utilities and fixtures for integration tests.
//!
//! # Requirements
//! Integration tests require a PostgreSQL database (set DATABASE_URL).
//! By default the lexical source points at a closed local port with no retry
//! budget, so every lookup fails fast as unavailable. Tests that need
//! definitions start a local dictionary with [`TestContext::with_dictionary`].

#![allow(dead_code)]

pub mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use vocab_drill_backend::config::Config;
use vocab_drill_backend::db::Database;
use vocab_drill_backend::models::{DbWord, NewWord};
use vocab_drill_backend::{app, AppState};

/// Test context containing database connection and router.
pub struct TestContext {
    pub db: Arc<Database>,
    app: Router,
}

impl TestContext {
    /// Create a new test context whose lookups always fail.
    ///
    /// # Panics
    /// Panics if DATABASE_URL is not set or database connection fails.
    pub async fn new() -> Self {
        Self::build("http://127.0.0.1:9/entries".to_string()).await
    }

    /// Create a test context backed by a local dictionary that knows only
    /// `known` words. Their definition is [`fixtures::refreshed_meaning`].
    pub async fn with_dictionary(known: Vec<String>) -> Self {
        let url = spawn_dictionary(known).await;
        Self::build(url).await
    }

    async fn build(lexical_api_url: String) -> Self {
        dotenvy::dotenv().ok();

        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for integration tests");

        let config = Config {
            database_url,
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            lexical_api_url,
            lexical_max_elapsed: Duration::ZERO,
            db_max_connections: 5,
        };

        let db = Database::connect(&config.database_url, config.db_max_connections)
            .await
            .expect("Failed to connect to test database");

        db.run_migrations()
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(db, config).expect("Failed to build app state");
        let db = state.db.clone();

        Self { db, app: app(state) }
    }

    /// Get the router for use with axum-test.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    /// Insert a word with a definition, bypassing the lexical lookup.
    pub async fn seed_word(&self, text: &str, group: &str) -> DbWord {
        self.db
            .create_word(&NewWord {
                text: text.to_string(),
                group: group.to_string(),
                definition: Some(format!("meaning of {text}")),
                synonyms: vec!["alpha".to_string(), "beta".to_string()],
            })
            .await
            .expect("Failed to seed word")
    }

    /// Remove seeded words. Their answer events cascade.
    pub async fn cleanup_words(&self, word_ids: &[i64]) {
        for id in word_ids {
            let _ = self.db.delete_word(*id).await;
        }
    }

    /// Remove a quiz session and any events still pointing at it.
    pub async fn cleanup_session(&self, session_id: Uuid) {
        let _ = sqlx::query("DELETE FROM progress_events WHERE session_id = $1")
            .bind(session_id)
            .execute(self.db.pool())
            .await;

        let _ = sqlx::query("DELETE FROM quiz_sessions WHERE id = $1")
            .bind(session_id)
            .execute(self.db.pool())
            .await;
    }

    /// Remove every session that quizzed `group`.
    pub async fn cleanup_sessions_for_group(&self, group: &str) {
        let _ = sqlx::query(
            r#"
            DELETE FROM progress_events
            WHERE session_id IN (SELECT id FROM quiz_sessions WHERE $1 = ANY(groups))
            "#,
        )
        .bind(group)
        .execute(self.db.pool())
        .await;

        let _ = sqlx::query("DELETE FROM quiz_sessions WHERE $1 = ANY(groups)")
            .bind(group)
            .execute(self.db.pool())
            .await;
    }

    /// Ids of stored words whose text contains `search`.
    pub async fn word_ids_matching(&self, search: &str) -> Vec<i64> {
        self.db
            .list_words(Some(search), None)
            .await
            .expect("Failed to list words")
            .iter()
            .map(|w| w.id)
            .collect()
    }
}

/// Serve a dictionaryapi.dev-shaped endpoint on an ephemeral local port.
async fn spawn_dictionary(known: Vec<String>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind dictionary");
    let addr = listener.local_addr().expect("Dictionary has no address");

    let known = Arc::new(known);
    let app = Router::new().route(
        "/entries/:word",
        get(move |Path(word): Path<String>| {
            let known = known.clone();
            async move { dictionary_entry(&known, word) }
        }),
    );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    format!("http://{addr}/entries")
}

fn dictionary_entry(known: &[String], word: String) -> Response {
    if !known.contains(&word) {
        return (StatusCode::NOT_FOUND, Json(json!({ "title": "No Definitions Found" })))
            .into_response();
    }

    Json(json!([{
        "word": word,
        "meanings": [{
            "partOfSpeech": "adjective",
            "definitions": [{
                "definition": fixtures::refreshed_meaning(&word),
                "synonyms": ["fresh"],
            }],
            "synonyms": ["renewed"],
        }],
    }]))
    .into_response()
}
