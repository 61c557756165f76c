//! crates/companion_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format,
//! except for the closed enums and the sentiment pair, which serialize
//! directly in API payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Placeholder name a chat session carries until its first message arrives.
pub const NEW_CHAT_NAME: &str = "New conversation";

/// Maximum number of characters of the first message used as the chat name.
const CHAT_NAME_PREVIEW_CHARS: usize = 30;

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string; empty for anonymous accounts, which can never log in.
    pub password_hash: String,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// A chat conversation owned by exactly one user.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which side of the conversation produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// Emotional valence of a message: a raw score plus a closed label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub score: f64,
    pub label: SentimentLabel,
}

impl Sentiment {
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            label: SentimentLabel::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "positive" => Ok(SentimentLabel::Positive),
            "negative" => Ok(SentimentLabel::Negative),
            "neutral" => Ok(SentimentLabel::Neutral),
            other => Err(format!("invalid sentiment label: '{other}'")),
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// A single message within a chat session.
///
/// Messages are ordered by `timestamp` within a session. Sentiment is
/// attached to user messages once the responder has judged them.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    pub sentiment: Option<Sentiment>,
}

/// What the responder produces for one user message.
#[derive(Debug, Clone)]
pub struct BotTurn {
    pub reply: String,
    pub sentiment: Sentiment,
}

/// Closed set of moods a user can log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Joyful,
    Happy,
    Content,
    Neutral,
    Sad,
    Anxious,
    Stressed,
    Angry,
    Exhausted,
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Mood::Joyful => "joyful",
            Mood::Happy => "happy",
            Mood::Content => "content",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
            Mood::Stressed => "stressed",
            Mood::Angry => "angry",
            Mood::Exhausted => "exhausted",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Mood {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "joyful" => Ok(Mood::Joyful),
            "happy" => Ok(Mood::Happy),
            "content" => Ok(Mood::Content),
            "neutral" => Ok(Mood::Neutral),
            "sad" => Ok(Mood::Sad),
            "anxious" => Ok(Mood::Anxious),
            "stressed" => Ok(Mood::Stressed),
            "angry" => Ok(Mood::Angry),
            "exhausted" => Ok(Mood::Exhausted),
            other => Err(format!("invalid mood: '{other}'")),
        }
    }
}

/// A single mood log entry owned by one user.
#[derive(Debug, Clone)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub mood: Mood,
    pub note: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Derives a chat session's display name from its first message: the first
/// 30 characters of the content, with an ellipsis marker when truncated.
/// Counts characters, not bytes, so multi-byte content never splits.
pub fn chat_name_from_message(content: &str) -> String {
    let mut name: String = content.chars().take(CHAT_NAME_PREVIEW_CHARS).collect();
    if content.chars().count() > CHAT_NAME_PREVIEW_CHARS {
        name.push_str("...");
    }
    name
}

/// Synthetic unique email for an anonymous account.
pub fn anonymous_email() -> String {
    format!("anonymous-{}@companion.local", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_name_short_message_kept_verbatim() {
        assert_eq!(chat_name_from_message("hello"), "hello");
    }

    #[test]
    fn test_chat_name_exactly_thirty_chars_has_no_ellipsis() {
        let content = "a".repeat(30);
        assert_eq!(chat_name_from_message(&content), content);
    }

    #[test]
    fn test_chat_name_long_message_truncated_with_ellipsis() {
        let content = "x".repeat(40);
        let name = chat_name_from_message(&content);
        assert_eq!(name, format!("{}...", "x".repeat(30)));
        assert_eq!(name.chars().count(), 33);
    }

    #[test]
    fn test_chat_name_counts_characters_not_bytes() {
        let content = "å".repeat(31);
        let name = chat_name_from_message(&content);
        assert_eq!(name, format!("{}...", "å".repeat(30)));
    }

    #[test]
    fn test_sender_roundtrip() {
        for sender in [Sender::User, Sender::Bot] {
            let parsed: Sender = sender.to_string().parse().unwrap();
            assert_eq!(sender, parsed);
        }
        assert!("robot".parse::<Sender>().is_err());
    }

    #[test]
    fn test_sender_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::Bot).unwrap(), "\"bot\"");
        let parsed: Sender = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(parsed, Sender::User);
    }

    #[test]
    fn test_mood_roundtrip() {
        for mood in [
            Mood::Joyful,
            Mood::Happy,
            Mood::Content,
            Mood::Neutral,
            Mood::Sad,
            Mood::Anxious,
            Mood::Stressed,
            Mood::Angry,
            Mood::Exhausted,
        ] {
            let parsed: Mood = mood.to_string().parse().unwrap();
            assert_eq!(mood, parsed);
        }
        assert!("ecstatic".parse::<Mood>().is_err());
    }

    #[test]
    fn test_neutral_sentiment() {
        let sentiment = Sentiment::neutral();
        assert_eq!(sentiment.score, 0.0);
        assert_eq!(sentiment.label, SentimentLabel::Neutral);
        let json = serde_json::to_string(&sentiment).unwrap();
        assert!(json.contains("\"label\":\"neutral\""));
    }

    #[test]
    fn test_anonymous_emails_are_unique() {
        let a = anonymous_email();
        let b = anonymous_email();
        assert_ne!(a, b);
        assert!(a.starts_with("anonymous-"));
        assert!(a.ends_with("@companion.local"));
    }
}
