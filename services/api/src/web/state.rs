//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::token::TokenService;
use companion_core::ports::{DatabaseService, ResponderService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub responder: Arc<dyn ResponderService>,
    pub tokens: TokenService,
    pub config: Arc<Config>,
}
