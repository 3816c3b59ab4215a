use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use super::AppState;

/// GET /api/health - Liveness check
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "message": "Cooking Book API is running",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": cookbook_shared::format_timestamp(cookbook_shared::now()),
    }))
}

/// GET /api/ready - Readiness check against the database connection
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.pool).await {
        Ok(_) => (StatusCode::OK, Json(json!({"status": "ready"}))),
        Err(e) => {
            tracing::error!("Readiness check failed: database unavailable - {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "reason": "database_unavailable"
                })),
            )
        }
    }
}
