//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use companion_core::domain::{
    anonymous_email, ChatSession, Message, Mood, MoodEntry, Sender, Sentiment, SentimentLabel,
    User, NEW_CHAT_NAME,
};
use companion_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    is_anonymous: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}
impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            is_anonymous: self.is_anonymous,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_login: self.last_login,
        }
    }
}

#[derive(FromRow)]
struct ChatRecord {
    id: Uuid,
    user_id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl ChatRecord {
    fn to_domain(self) -> ChatSession {
        ChatSession {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct MessageRecord {
    id: Uuid,
    chat_id: Uuid,
    content: String,
    sender: String,
    timestamp: DateTime<Utc>,
    sentiment_score: Option<f64>,
    sentiment_label: Option<String>,
}
impl MessageRecord {
    fn to_domain(self) -> PortResult<Message> {
        let sender: Sender = self
            .sender
            .parse()
            .map_err(PortError::Unexpected)?;
        let sentiment = match (self.sentiment_score, self.sentiment_label) {
            (Some(score), Some(label)) => {
                let label: SentimentLabel = label.parse().map_err(PortError::Unexpected)?;
                Some(Sentiment { score, label })
            }
            _ => None,
        };
        Ok(Message {
            id: self.id,
            chat_id: self.chat_id,
            content: self.content,
            sender,
            timestamp: self.timestamp,
            sentiment,
        })
    }
}

#[derive(FromRow)]
struct MoodRecord {
    id: Uuid,
    user_id: Uuid,
    mood: String,
    note: Option<String>,
    timestamp: DateTime<Utc>,
}
impl MoodRecord {
    fn to_domain(self) -> PortResult<MoodEntry> {
        let mood: Mood = self.mood.parse().map_err(PortError::Unexpected)?;
        Ok(MoodEntry {
            id: self.id,
            user_id: self.user_id,
            mood,
            note: self.note,
            timestamp: self.timestamp,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, name, email, password_hash, is_anonymous, created_at, updated_at)
             VALUES ($1, $2, $3, $4, FALSE, $5, $5)
             RETURNING id, name, email, password_hash, is_anonymous, created_at, updated_at, last_login",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => PortError::DuplicateEmail,
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_anonymous_user(&self) -> PortResult<User> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (id, name, email, password_hash, is_anonymous, created_at, updated_at)
             VALUES ($1, $2, $3, '', TRUE, $4, $4)
             RETURNING id, name, email, password_hash, is_anonymous, created_at, updated_at, last_login",
        )
        .bind(Uuid::new_v4())
        .bind("Anonymous User")
        .bind(anonymous_email())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, is_anonymous, created_at, updated_at, last_login
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("User".to_string()))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, name, email, password_hash, is_anonymous, created_at, updated_at, last_login
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("User".to_string()))?;
        Ok(record.to_domain())
    }

    async fn record_login(&self, user_id: Uuid) -> PortResult<()> {
        sqlx::query("UPDATE users SET last_login = $2, updated_at = $2 WHERE id = $1")
            .bind(user_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_chat(&self, user_id: Uuid) -> PortResult<ChatSession> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, ChatRecord>(
            "INSERT INTO chat_sessions (id, user_id, name, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING id, user_id, name, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(NEW_CHAT_NAME)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_chats(&self, user_id: Uuid) -> PortResult<Vec<ChatSession>> {
        let records = sqlx::query_as::<_, ChatRecord>(
            "SELECT id, user_id, name, created_at, updated_at
             FROM chat_sessions WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_chat(&self, user_id: Uuid, chat_id: Uuid) -> PortResult<ChatSession> {
        // Ownership is part of the lookup predicate: someone else's chat is
        // indistinguishable from a missing one.
        let record = sqlx::query_as::<_, ChatRecord>(
            "SELECT id, user_id, name, created_at, updated_at
             FROM chat_sessions WHERE id = $1 AND user_id = $2",
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("Chat".to_string()))?;
        Ok(record.to_domain())
    }

    async fn rename_chat(&self, chat_id: Uuid, name: &str) -> PortResult<()> {
        sqlx::query("UPDATE chat_sessions SET name = $2, updated_at = $3 WHERE id = $1")
            .bind(chat_id)
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn touch_chat(&self, chat_id: Uuid) -> PortResult<()> {
        sqlx::query("UPDATE chat_sessions SET updated_at = $2 WHERE id = $1")
            .bind(chat_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn save_message(&self, message: &Message) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO messages (id, chat_id, content, sender, timestamp, sentiment_score, sentiment_label)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(message.id)
        .bind(message.chat_id)
        .bind(&message.content)
        .bind(message.sender.to_string())
        .bind(message.timestamp)
        .bind(message.sentiment.map(|s| s.score))
        .bind(message.sentiment.map(|s| s.label.to_string()))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn list_messages(&self, chat_id: Uuid) -> PortResult<Vec<Message>> {
        let records = sqlx::query_as::<_, MessageRecord>(
            "SELECT id, chat_id, content, sender, timestamp, sentiment_score, sentiment_label
             FROM messages WHERE chat_id = $1 ORDER BY timestamp ASC",
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn set_message_sentiment(
        &self,
        message_id: Uuid,
        sentiment: &Sentiment,
    ) -> PortResult<()> {
        sqlx::query("UPDATE messages SET sentiment_score = $2, sentiment_label = $3 WHERE id = $1")
            .bind(message_id)
            .bind(sentiment.score)
            .bind(sentiment.label.to_string())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn create_mood(
        &self,
        user_id: Uuid,
        mood: Mood,
        note: Option<String>,
    ) -> PortResult<MoodEntry> {
        let record = sqlx::query_as::<_, MoodRecord>(
            "INSERT INTO mood_entries (id, user_id, mood, note, timestamp)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, user_id, mood, note, timestamp",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(mood.to_string())
        .bind(note)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn list_moods(
        &self,
        user_id: Uuid,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> PortResult<Vec<MoodEntry>> {
        let records = sqlx::query_as::<_, MoodRecord>(
            "SELECT id, user_id, mood, note, timestamp
             FROM mood_entries
             WHERE user_id = $1
               AND ($2::timestamptz IS NULL OR timestamp >= $2)
               AND ($3::timestamptz IS NULL OR timestamp <= $3)
             ORDER BY timestamp DESC",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn get_mood(&self, user_id: Uuid, mood_id: Uuid) -> PortResult<MoodEntry> {
        let record = sqlx::query_as::<_, MoodRecord>(
            "SELECT id, user_id, mood, note, timestamp
             FROM mood_entries WHERE id = $1 AND user_id = $2",
        )
        .bind(mood_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound("Mood entry".to_string()))?;
        record.to_domain()
    }
}
