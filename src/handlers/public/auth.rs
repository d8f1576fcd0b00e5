use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{LoginRequest, RegisterRequest, TokenResponse};

/// POST /api/auth/register - create an account and return a token (201)
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(request) = payload?;
    let token = state.auth.register(request).await?;
    Ok(ApiResponse::created(token))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(request) = payload?;
    Ok(ApiResponse::success(state.auth.login(request).await?))
}
