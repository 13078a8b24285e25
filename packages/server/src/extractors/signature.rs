use axum::extract::{FromRequestParts, OriginalUri, Query};
use axum::http::request::Parts;
use forge_common::signature::{SIGNATURE_PREFIX, verify_signature};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::AppError;
use crate::state::AppState;

/// Query string carried by every read API request.
#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SignedQuery {
    /// Hex HMAC-SHA256 of the request path (e.g. `/api/v1/plugins/1`),
    /// keyed with `api.secret`.
    pub hash: Option<String>,
}

/// Proof that the request path was signed with `api.secret`.
///
/// Add this as a handler parameter to require a valid `?hash=`.
pub struct SignedPath;

impl FromRequestParts<AppState> for SignedPath {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(query) =
            Query::<SignedQuery>::try_from_uri(&parts.uri).map_err(|_| AppError::SignatureInvalid)?;
        let hash = query
            .hash
            .filter(|h| !h.is_empty())
            .ok_or(AppError::SignatureMissing)?;

        // Nested routers see a stripped URI; sign over the full path.
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map(|uri| uri.0.path().to_owned())
            .unwrap_or_else(|| parts.uri.path().to_owned());

        let claimed = format!("{SIGNATURE_PREFIX}{hash}");
        match verify_signature(state.config.api.secret.as_bytes(), path.as_bytes(), &claimed) {
            Ok(true) => Ok(SignedPath),
            Ok(false) | Err(_) => {
                tracing::debug!(path = %path, "Rejected read request with invalid hash");
                Err(AppError::SignatureInvalid)
            }
        }
    }
}
