//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// Secrets shorter than this are rejected outright; an HS256 key should be
/// at least as long as the digest it feeds.
const MIN_SECRET_LEN: usize = 32;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    /// HMAC secret for signing bearer tokens. Required; there is no default.
    pub secret_key: String,
    pub token_ttl_days: i64,
    pub responder_timeout: Duration,
    pub openai_api_key: Option<String>,
    pub reply_model: String,
    pub log_level: Level,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        // A missing or weak signing secret must never fall back to a default.
        let secret_key = std::env::var("SECRET_KEY")
            .map_err(|_| ConfigError::MissingVar("SECRET_KEY".to_string()))?;
        if secret_key.len() < MIN_SECRET_LEN {
            return Err(ConfigError::InvalidValue(
                "SECRET_KEY".to_string(),
                format!("must be at least {MIN_SECRET_LEN} bytes"),
            ));
        }

        let token_ttl_days = match std::env::var("TOKEN_TTL_DAYS") {
            Ok(raw) => raw.parse::<i64>().map_err(|_| {
                ConfigError::InvalidValue(
                    "TOKEN_TTL_DAYS".to_string(),
                    format!("'{raw}' is not a whole number of days"),
                )
            })?,
            Err(_) => 7,
        };

        let responder_timeout = match std::env::var("RESPONDER_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs = raw.parse::<u64>().map_err(|_| {
                    ConfigError::InvalidValue(
                        "RESPONDER_TIMEOUT_SECS".to_string(),
                        format!("'{raw}' is not a whole number of seconds"),
                    )
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(15),
        };

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load Responder Settings (API key is optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        let reply_model =
            std::env::var("REPLY_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Ok(Self {
            bind_address,
            database_url,
            secret_key,
            token_ttl_days,
            responder_timeout,
            openai_api_key,
            reply_model,
            log_level,
        })
    }
}
