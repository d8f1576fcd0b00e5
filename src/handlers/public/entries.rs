//! Read-only noun and verb endpoints. `list` and `show` are generic over the
//! entry kind and mounted once per kind.

use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    Path, Query, State,
};

use crate::app::AppState;
use crate::database::models::{Entry, Verb};
use crate::database::store::{EntryStore, Store};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{ListRequest, Page};

/// GET /api/nouns, GET /api/verbs - paginated, filtered listing
pub async fn list<E>(
    State(state): State<AppState>,
    query: Result<Query<ListRequest>, QueryRejection>,
) -> ApiResult<Page<E>>
where
    E: Entry,
    dyn Store: EntryStore<E>,
{
    let Query(request) = query?;
    Ok(ApiResponse::success(state.entries.list::<E>(request).await?))
}

/// GET /api/nouns/:id, GET /api/verbs/:id
pub async fn show<E>(State(state): State<AppState>, id: Result<Path<i64>, PathRejection>) -> ApiResult<E>
where
    E: Entry,
    dyn Store: EntryStore<E>,
{
    let Path(id) = id?;
    Ok(ApiResponse::success(state.entries.get::<E>(id).await?))
}

/// GET /api/verbs/pair/:pair_id
pub async fn verb_by_pair(State(state): State<AppState>, Path(pair_id): Path<String>) -> ApiResult<Verb> {
    Ok(ApiResponse::success(state.entries.verb_by_pair(&pair_id).await?))
}
