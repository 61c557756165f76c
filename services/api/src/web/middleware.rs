//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::web::error::ApiFailure;
use crate::web::state::AppState;

/// Middleware that resolves the bearer token to a full user record.
///
/// If valid, inserts the user into request extensions for handlers to use.
/// Any failure along the way (missing header, malformed scheme, bad
/// signature, expired token, no matching user) is 401 before the
/// handler runs.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiFailure::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiFailure::Unauthorized)?;

    let user_id = state
        .tokens
        .validate(token)
        .map_err(|_| ApiFailure::Unauthorized)?;

    // A well-formed token whose subject no longer resolves is just as invalid.
    let user = state.db.get_user_by_id(user_id).await.map_err(|e| {
        warn!("token subject {user_id} did not resolve: {e}");
        ApiFailure::Unauthorized
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
