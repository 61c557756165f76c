//! Shared test harness: an in-memory `DatabaseService` implementation and
//! helpers for driving the full router without a running Postgres.

#![allow(dead_code)]

use api_lib::adapters::ScriptedResponder;
use api_lib::config::Config;
use api_lib::token::TokenService;
use api_lib::web::{self, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use companion_core::domain::{
    anonymous_email, BotTurn, ChatSession, Message, Mood, MoodEntry, Sentiment, User,
    NEW_CHAT_NAME,
};
use companion_core::ports::{DatabaseService, PortError, PortResult, ResponderService};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

//=========================================================================================
// In-memory store
//=========================================================================================

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    chats: Vec<ChatSession>,
    messages: Vec<Message>,
    moods: Vec<MoodEntry>,
}

#[async_trait]
impl DatabaseService for MemoryStore {
    async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> PortResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(PortError::DuplicateEmail);
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_anonymous: false,
            created_at: now,
            updated_at: now,
            last_login: None,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn create_anonymous_user(&self) -> PortResult<User> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "Anonymous User".to_string(),
            email: anonymous_email(),
            password_hash: String::new(),
            is_anonymous: true,
            created_at: now,
            updated_at: now,
            last_login: None,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<User> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound("User".to_string()))
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let inner = self.inner.lock().unwrap();
        inner
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("User".to_string()))
    }

    async fn record_login(&self, user_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.last_login = Some(now);
            user.updated_at = now;
        }
        Ok(())
    }

    async fn create_chat(&self, user_id: Uuid) -> PortResult<ChatSession> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let chat = ChatSession {
            id: Uuid::new_v4(),
            user_id,
            name: NEW_CHAT_NAME.to_string(),
            created_at: now,
            updated_at: now,
        };
        inner.chats.push(chat.clone());
        Ok(chat)
    }

    async fn list_chats(&self, user_id: Uuid) -> PortResult<Vec<ChatSession>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .chats
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_chat(&self, user_id: Uuid, chat_id: Uuid) -> PortResult<ChatSession> {
        let inner = self.inner.lock().unwrap();
        inner
            .chats
            .iter()
            .find(|c| c.id == chat_id && c.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Chat".to_string()))
    }

    async fn rename_chat(&self, chat_id: Uuid, name: &str) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        if let Some(chat) = inner.chats.iter_mut().find(|c| c.id == chat_id) {
            chat.name = name.to_string();
            chat.updated_at = now;
        }
        Ok(())
    }

    async fn touch_chat(&self, chat_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        if let Some(chat) = inner.chats.iter_mut().find(|c| c.id == chat_id) {
            chat.updated_at = now;
        }
        Ok(())
    }

    async fn save_message(&self, message: &Message) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.messages.push(message.clone());
        Ok(())
    }

    async fn list_messages(&self, chat_id: Uuid) -> PortResult<Vec<Message>> {
        let inner = self.inner.lock().unwrap();
        let mut messages: Vec<Message> = inner
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    async fn set_message_sentiment(
        &self,
        message_id: Uuid,
        sentiment: &Sentiment,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(message) = inner.messages.iter_mut().find(|m| m.id == message_id) {
            message.sentiment = Some(*sentiment);
        }
        Ok(())
    }

    async fn create_mood(
        &self,
        user_id: Uuid,
        mood: Mood,
        note: Option<String>,
    ) -> PortResult<MoodEntry> {
        let mut inner = self.inner.lock().unwrap();
        let entry = MoodEntry {
            id: Uuid::new_v4(),
            user_id,
            mood,
            note,
            timestamp: Utc::now(),
        };
        inner.moods.push(entry.clone());
        Ok(entry)
    }

    async fn list_moods(
        &self,
        user_id: Uuid,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> PortResult<Vec<MoodEntry>> {
        let inner = self.inner.lock().unwrap();
        let mut entries: Vec<MoodEntry> = inner
            .moods
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter(|e| start.map_or(true, |s| e.timestamp >= s))
            .filter(|e| end.map_or(true, |s| e.timestamp <= s))
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    async fn get_mood(&self, user_id: Uuid, mood_id: Uuid) -> PortResult<MoodEntry> {
        let inner = self.inner.lock().unwrap();
        inner
            .moods
            .iter()
            .find(|e| e.id == mood_id && e.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound("Mood entry".to_string()))
    }
}

//=========================================================================================
// Failing responder for upstream-failure tests
//=========================================================================================

pub struct FailingResponder;

#[async_trait]
impl ResponderService for FailingResponder {
    async fn respond(&self, _message: &str) -> PortResult<BotTurn> {
        Err(PortError::Upstream("synthetic outage".to_string()))
    }
}

//=========================================================================================
// App construction and request helpers
//=========================================================================================

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

pub fn spawn_app() -> TestApp {
    app_with_responder(Arc::new(ScriptedResponder))
}

pub fn app_with_responder(responder: Arc<dyn ResponderService>) -> TestApp {
    let config = Arc::new(Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        secret_key: TEST_SECRET.to_string(),
        token_ttl_days: 7,
        responder_timeout: std::time::Duration::from_secs(2),
        openai_api_key: None,
        reply_model: "gpt-4o-mini".to_string(),
        log_level: tracing::Level::INFO,
    });
    let state = Arc::new(AppState {
        db: Arc::new(MemoryStore::default()),
        responder,
        tokens: TokenService::new(TEST_SECRET, chrono::Duration::days(7)),
        config,
    });
    TestApp {
        router: web::router(state.clone()),
        state,
    }
}

/// Sends one request through the router and returns status + parsed JSON
/// body (`Value::Null` when the body is empty).
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Registers a user through the API and logs in, returning (token, user id).
pub async fn signup_and_login(app: &TestApp, name: &str, email: &str, password: &str) -> (String, Uuid) {
    let (status, body) = send(
        &app.router,
        json_request(
            "POST",
            "/users",
            None,
            Some(serde_json::json!({ "name": name, "email": email, "password": password })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id: Uuid = body["id"].as_str().unwrap().parse().unwrap();

    let encoded_email = email.replace('@', "%40");
    let (status, body) = send(
        &app.router,
        form_request("/token", &format!("username={encoded_email}&password={password}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (body["access_token"].as_str().unwrap().to_string(), user_id)
}
