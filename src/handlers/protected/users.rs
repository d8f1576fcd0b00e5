use axum::extract::{rejection::JsonRejection, Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::app::AppState;
use crate::database::models::{UserPublic, UserResponse, UserUpdate};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// GET /api/users/me
pub async fn me(AuthUser(user): AuthUser) -> ApiResult<UserResponse> {
    Ok(ApiResponse::success(UserResponse::from(&user)))
}

/// PUT /api/users/me
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let Json(input) = payload?;
    let user = state.users.update_me(&actor, input).await?;
    Ok(ApiResponse::success(UserResponse::from(&user)))
}

/// GET /api/users?skip=&limit= (admin)
pub async fn list(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<UserPublic>> {
    let users = state.users.list(&actor, query.skip, query.limit).await?;
    Ok(ApiResponse::success(users.iter().map(UserPublic::from).collect()))
}

/// GET /api/users/:id (admin or teacher)
pub async fn show(State(state): State<AppState>, AuthUser(actor): AuthUser, Path(id): Path<i64>) -> ApiResult<UserPublic> {
    let user = state.users.get(&actor, id).await?;
    Ok(ApiResponse::success(UserPublic::from(&user)))
}

/// PUT /api/users/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let Json(input) = payload?;
    let user = state.users.update_by_id(&actor, id, input).await?;
    Ok(ApiResponse::success(UserResponse::from(&user)))
}

/// DELETE /api/users/:id (admin)
pub async fn delete(State(state): State<AppState>, AuthUser(actor): AuthUser, Path(id): Path<i64>) -> ApiResult<()> {
    state.users.delete(&actor, id).await?;
    Ok(ApiResponse::no_content())
}
