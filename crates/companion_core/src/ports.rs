//! crates/companion_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{BotTurn, ChatSession, Message, Mood, MoodEntry, Sentiment, User};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Upstream responder failed: {0}")]
    Upstream(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User>;

    /// Creates a user with a synthetic email and an empty, unusable password hash.
    async fn create_anonymous_user(&self) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    /// Stamps `last_login` and `updated_at` after a successful credential check.
    async fn record_login(&self, user_id: Uuid) -> PortResult<()>;

    // --- Chat Sessions ---
    async fn create_chat(&self, user_id: Uuid) -> PortResult<ChatSession>;

    async fn list_chats(&self, user_id: Uuid) -> PortResult<Vec<ChatSession>>;

    /// Ownership-checked lookup: a chat that exists but belongs to another
    /// user is reported as `NotFound`, same as a missing one.
    async fn get_chat(&self, user_id: Uuid, chat_id: Uuid) -> PortResult<ChatSession>;

    async fn rename_chat(&self, chat_id: Uuid, name: &str) -> PortResult<()>;

    /// Bumps the chat's `updated_at` timestamp.
    async fn touch_chat(&self, chat_id: Uuid) -> PortResult<()>;

    // --- Messages ---
    async fn save_message(&self, message: &Message) -> PortResult<()>;

    /// Messages ordered by timestamp ascending.
    async fn list_messages(&self, chat_id: Uuid) -> PortResult<Vec<Message>>;

    async fn set_message_sentiment(
        &self,
        message_id: Uuid,
        sentiment: &Sentiment,
    ) -> PortResult<()>;

    // --- Mood Entries ---
    async fn create_mood(
        &self,
        user_id: Uuid,
        mood: Mood,
        note: Option<String>,
    ) -> PortResult<MoodEntry>;

    /// Entries within `[start, end]` inclusive, newest first.
    async fn list_moods(
        &self,
        user_id: Uuid,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> PortResult<Vec<MoodEntry>>;

    /// Ownership-checked lookup, merged `NotFound` as for `get_chat`.
    async fn get_mood(&self, user_id: Uuid, mood_id: Uuid) -> PortResult<MoodEntry>;
}

#[async_trait]
pub trait ResponderService: Send + Sync {
    /// Produces the bot's reply and a sentiment judgment for one user message.
    async fn respond(&self, message: &str) -> PortResult<BotTurn>;
}
