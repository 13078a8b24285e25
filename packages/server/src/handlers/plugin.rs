use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::signature::{SignedPath, SignedQuery};
use crate::models::plugin::{PluginDetailResponse, PluginListResponse};
use crate::registry::{PluginRegistry, PusherRegistry};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Plugins",
    operation_id = "listPlugins",
    summary = "List plugins",
    description = "Returns every tracked plugin ordered by ID, each with its full artifact history.",
    params(SignedQuery),
    responses(
        (status = 200, description = "All plugins", body = PluginListResponse),
        (status = 401, description = "Bad hash (SIGNATURE_MISSING, SIGNATURE_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip_all)]
pub async fn list_plugins(
    _signed: SignedPath,
    State(state): State<AppState>,
) -> Result<Json<PluginListResponse>, AppError> {
    let data = PluginRegistry::new(&state.db)
        .list()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Json(PluginListResponse { data }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Plugins",
    operation_id = "getPlugin",
    summary = "Get a plugin by ID",
    description = "Returns the plugin and the pusher of its most recent default-branch push. \
        `pusher` is null if that record is gone.",
    params(("id" = i32, Path, description = "Plugin ID"), SignedQuery),
    responses(
        (status = 200, description = "Plugin details", body = PluginDetailResponse),
        (status = 401, description = "Bad hash (SIGNATURE_MISSING, SIGNATURE_INVALID)", body = ErrorBody),
        (status = 404, description = "Plugin not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(_signed, state))]
pub async fn get_plugin(
    _signed: SignedPath,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PluginDetailResponse>, AppError> {
    let model = PluginRegistry::new(&state.db)
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Plugin not found".into()))?;
    let pusher = PusherRegistry::new(&state.db)
        .find_by_id(model.pusher_id)
        .await?;

    Ok(Json(PluginDetailResponse {
        plugin: model.into(),
        pusher: pusher.map(Into::into),
    }))
}
