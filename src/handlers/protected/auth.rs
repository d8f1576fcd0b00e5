use crate::database::models::UserPublic;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/auth/me
pub async fn me(AuthUser(user): AuthUser) -> ApiResult<UserPublic> {
    Ok(ApiResponse::success(UserPublic::from(&user)))
}
