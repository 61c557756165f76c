//! services/api/src/web/mod.rs
//!
//! The Axum web layer: router assembly and the master OpenAPI definition.

pub mod auth;
pub mod chat;
pub mod error;
pub mod middleware;
pub mod mood;
pub mod state;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use state::AppState;

pub use middleware::require_auth;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::token_handler,
        auth::create_user_handler,
        auth::anonymous_user_handler,
        auth::me_handler,
        chat::create_chat_handler,
        chat::list_chats_handler,
        chat::get_chat_handler,
        chat::post_message_handler,
        mood::create_mood_handler,
        mood::list_moods_handler,
        mood::get_mood_handler,
    ),
    components(
        schemas(
            auth::TokenRequest,
            auth::TokenResponse,
            auth::CreateUserRequest,
            auth::UserResponse,
            chat::SendMessageRequest,
            chat::MessageResponse,
            chat::ChatResponse,
            mood::CreateMoodRequest,
            mood::MoodEntryResponse,
            error::ErrorBody,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Companion API", description = "API endpoints for the mental-health companion backend.")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//=========================================================================================
// Router Assembly
//=========================================================================================

/// Builds the full application router over the shared state. Protected
/// routes sit behind the auth middleware; everything else is public.
pub fn router(state: Arc<AppState>) -> Router {
    let public_routes = Router::new()
        .route("/token", post(auth::token_handler))
        .route("/users", post(auth::create_user_handler))
        .route("/users/anonymous", post(auth::anonymous_user_handler));

    let protected_routes = Router::new()
        .route("/users/me", get(auth::me_handler))
        .route(
            "/chats",
            post(chat::create_chat_handler).get(chat::list_chats_handler),
        )
        .route("/chats/{chat_id}", get(chat::get_chat_handler))
        .route("/chats/{chat_id}/messages", post(chat::post_message_handler))
        .route(
            "/moods",
            post(mood::create_mood_handler).get(mood::list_moods_handler),
        )
        .route("/moods/{mood_id}", get(mood::get_mood_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
