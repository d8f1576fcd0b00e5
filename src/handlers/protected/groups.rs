//! Study group endpoints, mounted under `/api/noun-groups` and
//! `/api/verb-groups`. The entry type parameter selects the group kind.

use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde_json::{json, Value};

use crate::api::format::group_detail_value;
use crate::app::AppState;
use crate::database::models::{Entry, GroupInput, GroupUpdate, StudyGroup};
use crate::database::store::{EntryStore, Store};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET "" - caller's groups, plus their teachers' groups for students
pub async fn list<E: Entry>(State(state): State<AppState>, AuthUser(actor): AuthUser) -> ApiResult<Vec<StudyGroup>> {
    Ok(ApiResponse::success(state.groups.list(E::KIND, &actor).await?))
}

/// GET /:id - group with its member entries
pub async fn show<E>(State(state): State<AppState>, AuthUser(actor): AuthUser, Path(id): Path<i64>) -> ApiResult<Value>
where
    E: Entry,
    dyn Store: EntryStore<E>,
{
    let detail = state.groups.get::<E>(&actor, id).await?;
    let body = group_detail_value(&detail).map_err(|e| {
        tracing::error!("Failed to format group {}: {}", id, e);
        ApiError::internal_server_error("Failed to format response")
    })?;
    Ok(ApiResponse::success(body))
}

pub async fn create<E: Entry>(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    payload: Result<Json<GroupInput>, JsonRejection>,
) -> ApiResult<StudyGroup> {
    let Json(input) = payload?;
    Ok(ApiResponse::created(state.groups.create(E::KIND, &actor, input).await?))
}

pub async fn update<E: Entry>(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    payload: Result<Json<GroupUpdate>, JsonRejection>,
) -> ApiResult<StudyGroup> {
    let Json(input) = payload?;
    Ok(ApiResponse::success(state.groups.update(E::KIND, &actor, id, input).await?))
}

pub async fn delete<E: Entry>(State(state): State<AppState>, AuthUser(actor): AuthUser, Path(id): Path<i64>) -> ApiResult<()> {
    state.groups.delete(E::KIND, &actor, id).await?;
    Ok(ApiResponse::no_content())
}

/// POST /:id/nouns/:noun_id, POST /:id/verbs/:verb_id (201)
pub async fn add_member<E>(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((group_id, entry_id)): Path<(i64, i64)>,
) -> ApiResult<Value>
where
    E: Entry,
    dyn Store: EntryStore<E>,
{
    let message = state.groups.add_member::<E>(&actor, group_id, entry_id).await?;
    Ok(ApiResponse::created(json!({ "message": message })))
}

pub async fn remove_member<E: Entry>(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path((group_id, entry_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    state.groups.remove_member(E::KIND, &actor, group_id, entry_id).await?;
    Ok(ApiResponse::no_content())
}
