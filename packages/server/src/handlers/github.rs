use axum::Json;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use forge_common::{PushEvent, verify_signature};
use tracing::{Span, info, instrument, warn};

use crate::entity::plugin;
use crate::error::{AppError, ErrorBody};
use crate::models::webhook::{MessageResponse, PluginEnvelope};
use crate::registry::{PluginFields, PluginRegistry, PusherRegistry};
use crate::state::AppState;

pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
pub const EVENT_HEADER: &str = "x-github-event";
pub const DELIVERY_HEADER: &str = "x-github-delivery";

const NOT_DEFAULT_BRANCH: &str = "Not a push to the default branch.";

#[utoipa::path(
    post,
    path = "/github",
    tag = "Webhooks",
    operation_id = "receiveGithubWebhook",
    summary = "Receive a GitHub webhook delivery",
    description = "Verifies `X-Hub-Signature-256` over the raw body with the webhook secret. \
        A push to the repository's default branch clones, zips and publishes the tree, then \
        creates or updates the plugin record and returns it. Pushes to other refs, `ping` and \
        other events return a `{\"message\": ...}` body instead and change nothing.",
    request_body(content = String, content_type = "application/json", description = "GitHub push payload"),
    params(
        ("X-Hub-Signature-256" = String, Header, description = "`sha256=<hex>` HMAC of the raw body"),
        ("X-GitHub-Event" = Option<String>, Header, description = "Event name; defaults to `push`"),
    ),
    responses(
        (status = 200, description = "Plugin record after the build, or an informational message", body = PluginEnvelope),
        (status = 400, description = "Unparsable push payload (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Bad signature (SIGNATURE_MISSING, SIGNATURE_INVALID)", body = ErrorBody),
        (status = 500, description = "Metadata store failure (INTERNAL_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip_all, fields(event, delivery))]
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    verify_delivery(&state.config.github.webhook_secret, &headers, &body)?;

    let event = header_str(&headers, EVENT_HEADER).unwrap_or("push");
    let span = Span::current();
    span.record("event", event);
    if let Some(delivery) = header_str(&headers, DELIVERY_HEADER) {
        span.record("delivery", delivery);
    }

    match event {
        "push" => {}
        "ping" => return Ok(Json(MessageResponse::new("pong")).into_response()),
        other => {
            info!(event = other, "Ignoring non-push event");
            return Ok(Json(MessageResponse::new(format!("Ignored `{other}` event."))).into_response());
        }
    }

    let push: PushEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::Validation(format!("Invalid push payload: {e}")))?;

    if !push.targets_default_branch() {
        info!(
            git_ref = %push.git_ref,
            default_branch = %push.repository.default_branch,
            "Ignoring push outside the default branch"
        );
        return Ok(Json(MessageResponse::new(NOT_DEFAULT_BRANCH)).into_response());
    }

    // Detached so a client disconnect cannot abandon a build mid-way.
    let model = tokio::spawn(process_push(state, push))
        .await
        .map_err(|e| AppError::Internal(format!("Push processing task failed: {e}")))??;

    Ok(Json(PluginEnvelope {
        plugin: model.into(),
    })
    .into_response())
}

/// Resolve identities, build, and persist one default-branch push.
///
/// Holds the repository lock from reading the prior artifact list until the
/// new list is stored, so concurrent deliveries for one repository append in
/// arrival order.
#[instrument(skip_all, fields(full_name = %push.repository.full_name))]
async fn process_push(state: AppState, push: PushEvent) -> Result<plugin::Model, AppError> {
    let repo = &push.repository;
    let _lock = state.pipeline.lock_repository(&repo.full_name).await;

    let pushers = PusherRegistry::new(&state.db);
    let plugins = PluginRegistry::new(&state.db);
    let (pusher_id, existing) = tokio::try_join!(
        pushers.get_or_create_pusher_id(&push.pusher),
        plugins.find_by_full_name(&repo.full_name),
    )?;

    let prior_zips = existing.map(|p| p.zips).unwrap_or_default();
    let outcome = state
        .pipeline
        .build(&repo.name, &repo.html_url, prior_zips, &state.shutdown)
        .await;
    if !outcome.is_published() {
        warn!("Build failed; keeping previous artifact history");
    }

    let fields = PluginFields::from(repo);
    let model = plugins
        .upsert(&repo.full_name, &fields, outcome.zips(), pusher_id)
        .await?;
    Ok(model)
}

fn verify_delivery(secret: &str, headers: &HeaderMap, body: &[u8]) -> Result<(), AppError> {
    let claimed = header_str(headers, SIGNATURE_HEADER).ok_or(AppError::SignatureMissing)?;
    match verify_signature(secret.as_bytes(), body, claimed) {
        Ok(true) => Ok(()),
        Ok(false) | Err(_) => {
            warn!("Rejected delivery with invalid signature");
            Err(AppError::SignatureInvalid)
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Body limit for webhook deliveries (GitHub caps payloads at 25MB).
pub fn webhook_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(25 * 1024 * 1024)
}
