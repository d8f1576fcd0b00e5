use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;

/// The active user behind the request's bearer token.
///
/// Handlers that take this extractor reject the request with 401 when the
/// token is missing or invalid, or the user no longer exists, and with 403
/// when the account is inactive.
#[derive(Clone, Debug)]
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_from_headers(&parts.headers).map_err(|msg| {
            tracing::debug!("Rejected request to {}: {}", parts.uri.path(), msg);
            ApiError::unauthorized(msg)
        })?;

        let user = state.auth.authenticate(&token).await?;
        Ok(AuthUser(user))
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Not authenticated".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
