use axum::extract::State;

use crate::app::AppState;
use crate::database::models::RoleRecord;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/roles
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<RoleRecord>> {
    Ok(ApiResponse::success(state.users.roles().await?))
}
