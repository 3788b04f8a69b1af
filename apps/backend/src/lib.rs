pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;
use crate::services::lexical::{Dictionary, DictionaryApi, LookupClient, RetryPolicy};

/// Uploaded workbooks may be larger than axum's 2 MB default.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub lexicon: Arc<Dictionary>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the lexical client described by `config` around an open database.
    pub fn new(db: Database, config: Config) -> anyhow::Result<Self> {
        let source = DictionaryApi::new(&config.lexical_api_url)?;
        let lexicon = LookupClient::new(source, RetryPolicy::with_max_elapsed(config.lexical_max_elapsed));

        Ok(Self {
            db: Arc::new(db),
            lexicon: Arc::new(lexicon),
            config: Arc::new(config),
        })
    }
}

/// Build the API router. Every route lives under `/api`.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health::health))
        // Words
        .route("/groups", get(routes::words::groups))
        .route("/words", get(routes::words::list).post(routes::words::create))
        .route("/words/delete-all", delete(routes::words::delete_all))
        .route("/words/refresh-all", post(routes::words::refresh_all))
        .route(
            "/words/:id",
            put(routes::words::update).delete(routes::words::delete),
        )
        .route("/words/:id/refresh", post(routes::words::refresh))
        .route("/words-to-review", get(routes::words::to_review))
        // Flags
        .route("/flag-words", post(routes::words::flag))
        .route("/flagged-words", get(routes::words::flagged))
        .route("/flagged-words/:id/resolve", post(routes::words::resolve_flag))
        // Quiz
        .route("/test", post(routes::quiz::start))
        .route("/answer", post(routes::quiz::answer))
        .route("/test-complete", post(routes::quiz::complete))
        // Stats
        .route("/stats", get(routes::stats::stats))
        .route("/history", get(routes::stats::history))
        .route("/problematic-words", get(routes::stats::problematic))
        .route("/reset-stats", post(routes::stats::reset))
        // Import
        .route("/upload", post(routes::upload::upload));

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url, config.db_max_connections).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let addr = config.bind_addr();
    let state = AppState::new(db, config)?;

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
