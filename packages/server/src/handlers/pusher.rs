use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::signature::{SignedPath, SignedQuery};
use crate::models::pusher::{PusherDetailResponse, PusherListResponse};
use crate::registry::{PluginRegistry, PusherRegistry};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Pushers",
    operation_id = "listPushers",
    summary = "List pushers",
    params(SignedQuery),
    responses(
        (status = 200, description = "All pushers", body = PusherListResponse),
        (status = 401, description = "Bad hash (SIGNATURE_MISSING, SIGNATURE_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip_all)]
pub async fn list_pushers(
    _signed: SignedPath,
    State(state): State<AppState>,
) -> Result<Json<PusherListResponse>, AppError> {
    let data = PusherRegistry::new(&state.db)
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(PusherListResponse { data }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Pushers",
    operation_id = "getPusher",
    summary = "Get a pusher by ID",
    description = "Returns the pusher and every plugin whose latest default-branch push they made.",
    params(("id" = i32, Path, description = "Pusher ID"), SignedQuery),
    responses(
        (status = 200, description = "Pusher details", body = PusherDetailResponse),
        (status = 401, description = "Bad hash (SIGNATURE_MISSING, SIGNATURE_INVALID)", body = ErrorBody),
        (status = 404, description = "Pusher not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(_signed, state))]
pub async fn get_pusher(
    _signed: SignedPath,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PusherDetailResponse>, AppError> {
    let pusher = PusherRegistry::new(&state.db)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pusher not found".into()))?;
    let plugins = PluginRegistry::new(&state.db)
        .list_by_pusher(pusher.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(PusherDetailResponse {
        pusher: pusher.into(),
        plugins,
    }))
}
