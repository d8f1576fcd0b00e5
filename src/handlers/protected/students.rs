use axum::extract::{Path, State};

use crate::app::AppState;
use crate::database::models::UserPublic;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::StudentProgress;

/// GET /api/students - the calling teacher's students
pub async fn list(State(state): State<AppState>, AuthUser(teacher): AuthUser) -> ApiResult<Vec<UserPublic>> {
    let students = state.students.list(&teacher).await?;
    Ok(ApiResponse::success(students.iter().map(UserPublic::from).collect()))
}

/// POST /api/students/:id/link (201)
pub async fn link(State(state): State<AppState>, AuthUser(teacher): AuthUser, Path(id): Path<i64>) -> ApiResult<UserPublic> {
    let student = state.students.link(&teacher, id).await?;
    Ok(ApiResponse::created(UserPublic::from(&student)))
}

/// DELETE /api/students/:id/unlink (204)
pub async fn unlink(State(state): State<AppState>, AuthUser(teacher): AuthUser, Path(id): Path<i64>) -> ApiResult<()> {
    state.students.unlink(&teacher, id).await?;
    Ok(ApiResponse::no_content())
}

pub async fn progress(
    State(state): State<AppState>,
    AuthUser(teacher): AuthUser,
    Path(id): Path<i64>,
) -> ApiResult<StudentProgress> {
    Ok(ApiResponse::success(state.students.progress(&teacher, id).await?))
}
