use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;

use crate::app::AppState;
use crate::database::models::{Entry, Noun, NounCreate, NounUpdate, Verb, VerbCreate, VerbUpdate};
use crate::database::store::{EntryStore, Store};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// POST /api/nouns
pub async fn create_noun(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    payload: Result<Json<NounCreate>, JsonRejection>,
) -> ApiResult<Noun> {
    let Json(input) = payload?;
    Ok(ApiResponse::created(state.entries.create_noun(&actor, input).await?))
}

/// PUT /api/nouns/:id
pub async fn update_noun(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    payload: Result<Json<NounUpdate>, JsonRejection>,
) -> ApiResult<Noun> {
    let Json(input) = payload?;
    Ok(ApiResponse::success(state.entries.update_noun(&actor, id, input).await?))
}

/// POST /api/verbs
pub async fn create_verb(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    payload: Result<Json<VerbCreate>, JsonRejection>,
) -> ApiResult<Verb> {
    let Json(input) = payload?;
    Ok(ApiResponse::created(state.entries.create_verb(&actor, input).await?))
}

/// PUT /api/verbs/:id
pub async fn update_verb(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<i64>,
    payload: Result<Json<VerbUpdate>, JsonRejection>,
) -> ApiResult<Verb> {
    let Json(input) = payload?;
    Ok(ApiResponse::success(state.entries.update_verb(&actor, id, input).await?))
}

/// DELETE /api/nouns/:id, DELETE /api/verbs/:id (204)
pub async fn delete<E>(State(state): State<AppState>, AuthUser(actor): AuthUser, Path(id): Path<i64>) -> ApiResult<()>
where
    E: Entry,
    dyn Store: EntryStore<E>,
{
    state.entries.delete::<E>(&actor, id).await?;
    Ok(ApiResponse::no_content())
}
