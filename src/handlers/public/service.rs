use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// GET / - service name and version
pub async fn root() -> ApiResult<serde_json::Value> {
    Ok(ApiResponse::success(json!({
        "name": "Ruso API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Russian vocabulary learning API",
    })))
}

/// GET /health - pings the store
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "healthy", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
