//! services/api/src/web/auth.rs
//!
//! Account creation and login endpoints, plus the password hashing helpers.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Form, Json};
use chrono::{DateTime, Utc};
use companion_core::domain::User;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::{ApiFailure, ErrorBody};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// OAuth2-style password grant form: `username` carries the email.
#[derive(Deserialize, ToSchema)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Public view of a user record. Never carries the password hash.
#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            is_anonymous: user.is_anonymous,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

//=========================================================================================
// Password Hashing Helpers
//=========================================================================================

pub fn hash_password(raw: &str) -> Result<String, ApiFailure> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            error!("failed to hash password: {e}");
            ApiFailure::Internal("failed to hash password".to_string())
        })
}

/// Verifies a raw password against a stored PHC hash string. An empty or
/// malformed stored hash (anonymous accounts) never verifies.
pub fn verify_password(raw: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(raw.as_bytes(), &parsed_hash)
        .is_ok()
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /token - Exchange email + password for a bearer token
#[utoipa::path(
    post,
    path = "/token",
    request_body(content = TokenRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn token_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiFailure> {
    let email = form.username.trim().to_lowercase();
    let user = state
        .db
        .get_user_by_email(&email)
        .await
        .map_err(|_| ApiFailure::Unauthorized)?;

    // Anonymous accounts hold no usable credential.
    if user.is_anonymous || !verify_password(&form.password, &user.password_hash) {
        return Err(ApiFailure::Unauthorized);
    }

    state.db.record_login(user.id).await?;

    let access_token = state.tokens.issue(user.id).map_err(|e| {
        error!("failed to issue token: {e}");
        ApiFailure::Internal("failed to issue token".to_string())
    })?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// POST /users - Create a new user account
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Invalid input or email already registered", body = ErrorBody)
    )
)]
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiFailure::Validation("Name must not be empty".to_string()));
    }
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') || email.len() < 5 {
        return Err(ApiFailure::Validation("Invalid email".to_string()));
    }
    if req.password.len() < 8 {
        return Err(ApiFailure::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user = state.db.create_user(name, &email, &password_hash).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// POST /users/anonymous - Create an anonymous trial account
#[utoipa::path(
    post,
    path = "/users/anonymous",
    responses(
        (status = 201, description = "Anonymous user created", body = UserResponse)
    )
)]
pub async fn anonymous_user_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiFailure> {
    let user = state.db.create_anonymous_user().await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /users/me - Current authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "The authenticated user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn me_handler(Extension(user): Extension<User>) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}
