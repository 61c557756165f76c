//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, OpenAiReplyAdapter, ScriptedResponder},
    config::Config,
    error::ApiError,
    token::TokenService,
    web::{self, state::AppState, ApiDoc},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::Router;
use chrono::Duration;
use companion_core::ports::ResponderService;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize the Responder ---
    let responder: Arc<dyn ResponderService> = match &config.openai_api_key {
        Some(api_key) => {
            info!("Using model-backed responder ({})", config.reply_model);
            let client = Client::with_config(OpenAIConfig::new().with_api_key(api_key.clone()));
            Arc::new(OpenAiReplyAdapter::new(client, config.reply_model.clone()))
        }
        None => {
            info!("OPENAI_API_KEY not set; using the scripted responder");
            Arc::new(ScriptedResponder)
        }
    };

    // --- 4. Build the Shared AppState ---
    let tokens = TokenService::new(&config.secret_key, Duration::days(config.token_ttl_days));
    let app_state = Arc::new(AppState {
        db: db_adapter,
        responder,
        tokens,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let app = Router::new()
        .merge(web::router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
