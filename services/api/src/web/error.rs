//! services/api/src/web/error.rs
//!
//! Request-level failure type shared by all handlers, mapping the core port
//! errors onto HTTP status codes and a JSON error body.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use companion_core::ports::PortError;
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// Everything a handler can fail with. `NotFound` deliberately carries the
/// same message for "missing" and "not yours" so the two are
/// indistinguishable to the caller.
#[derive(Debug)]
pub enum ApiFailure {
    Validation(String),
    DuplicateEmail,
    Unauthorized,
    NotFound(String),
    Upstream(String),
    Internal(String),
}

impl From<PortError> for ApiFailure {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(what) => ApiFailure::NotFound(format!("{what} not found")),
            PortError::DuplicateEmail => ApiFailure::DuplicateEmail,
            PortError::Unauthorized => ApiFailure::Unauthorized,
            PortError::Upstream(msg) => ApiFailure::Upstream(msg),
            PortError::Unexpected(msg) => ApiFailure::Internal(msg),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiFailure::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiFailure::DuplicateEmail => {
                (StatusCode::BAD_REQUEST, "Email already registered".to_string())
            }
            ApiFailure::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Could not validate credentials".to_string(),
            ),
            ApiFailure::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiFailure::Upstream(detail) => {
                error!("responder failure: {detail}");
                (
                    StatusCode::BAD_GATEWAY,
                    "The responder is unavailable right now".to_string(),
                )
            }
            ApiFailure::Internal(detail) => {
                error!("internal error: {detail}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorBody { error: message });
        if status == StatusCode::UNAUTHORIZED {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
