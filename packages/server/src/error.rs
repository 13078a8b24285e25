use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`,
    /// `SIGNATURE_MISSING`, `SIGNATURE_INVALID`, `NOT_FOUND`, `INTERNAL_ERROR`.
    #[schema(example = "SIGNATURE_INVALID")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Request signature could not be verified")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    /// No signature accompanied the request.
    SignatureMissing,
    /// A signature was present but malformed or did not match.
    SignatureInvalid,
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::SignatureMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "SIGNATURE_MISSING",
                    message: "Request signature required".into(),
                },
            ),
            AppError::SignatureInvalid => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code: "SIGNATURE_INVALID",
                    message: "Request signature could not be verified".into(),
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}
