//! Health endpoint

use axum::{extract::State, http::StatusCode, Json};

use crate::models::HealthResponse;
use crate::AppState;

/// GET /api/health
/// 200 when the store answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, healthy, database) = match state.db.ping().await {
        Ok(()) => (StatusCode::OK, "healthy", "connected"),
        Err(e) => {
            tracing::warn!("Health check could not reach the database: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unreachable")
        }
    };

    (
        status,
        Json(HealthResponse {
            status: healthy.to_string(),
            database: database.to_string(),
            environment: state.config.environment.clone(),
        }),
    )
}
