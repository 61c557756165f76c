//! services/api/src/web/chat.rs
//!
//! Chat session endpoints, including the message-send flow that drives the
//! responder and the first-message naming of a session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use companion_core::domain::{
    chat_name_from_message, BotTurn, ChatSession, Message, Sender, Sentiment, User, NEW_CHAT_NAME,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::error::{ApiFailure, ErrorBody};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SendMessageRequest {
    pub content: String,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub content: String,
    #[schema(value_type = String)]
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[schema(value_type = Option<Object>)]
    pub sentiment: Option<Sentiment>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            chat_id: message.chat_id,
            content: message.content,
            sender: message.sender,
            timestamp: message.timestamp,
            sentiment: message.sentiment,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ChatResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub messages: Vec<MessageResponse>,
}

impl ChatResponse {
    fn new(chat: ChatSession, messages: Vec<Message>) -> Self {
        Self {
            id: chat.id,
            user_id: chat.user_id,
            name: chat.name,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
            messages: messages.into_iter().map(MessageResponse::from).collect(),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /chats - Create a new, empty chat session
#[utoipa::path(
    post,
    path = "/chats",
    responses(
        (status = 201, description = "Chat session created", body = ChatResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn create_chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<impl IntoResponse, ApiFailure> {
    let chat = state.db.create_chat(user.id).await?;
    Ok((StatusCode::CREATED, Json(ChatResponse::new(chat, vec![]))))
}

/// GET /chats - All of the caller's chat sessions, with messages
#[utoipa::path(
    get,
    path = "/chats",
    responses(
        (status = 200, description = "The caller's chat sessions", body = [ChatResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn list_chats_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<ChatResponse>>, ApiFailure> {
    let chats = state.db.list_chats(user.id).await?;
    let mut responses = Vec::with_capacity(chats.len());
    for chat in chats {
        let messages = state.db.list_messages(chat.id).await?;
        responses.push(ChatResponse::new(chat, messages));
    }
    Ok(Json(responses))
}

/// GET /chats/{chat_id} - One chat session with its messages
#[utoipa::path(
    get,
    path = "/chats/{chat_id}",
    params(("chat_id" = Uuid, Path, description = "Chat session id")),
    responses(
        (status = 200, description = "The chat session", body = ChatResponse),
        (status = 404, description = "Chat missing or owned by someone else", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn get_chat_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(chat_id): Path<Uuid>,
) -> Result<Json<ChatResponse>, ApiFailure> {
    let chat = state.db.get_chat(user.id, chat_id).await?;
    let messages = state.db.list_messages(chat.id).await?;
    Ok(Json(ChatResponse::new(chat, messages)))
}

/// POST /chats/{chat_id}/messages - Send a message and get the bot's reply
///
/// Persists the user message, names the session after it when it is the
/// first one, asks the responder for a reply and a sentiment judgment,
/// and returns the stored bot message. A responder failure after the retry
/// leaves the user message stored without sentiment or reply; the next
/// send proceeds normally.
#[utoipa::path(
    post,
    path = "/chats/{chat_id}/messages",
    params(("chat_id" = Uuid, Path, description = "Chat session id")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "The bot's reply message", body = MessageResponse),
        (status = 400, description = "Empty message content", body = ErrorBody),
        (status = 404, description = "Chat missing or owned by someone else", body = ErrorBody),
        (status = 502, description = "Responder unavailable", body = ErrorBody)
    ),
    security(("bearer" = []))
)]
pub async fn post_message_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<User>,
    Path(chat_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<MessageResponse>, ApiFailure> {
    if req.content.trim().is_empty() {
        return Err(ApiFailure::Validation(
            "Message content must not be empty".to_string(),
        ));
    }

    let chat = state.db.get_chat(user.id, chat_id).await?;

    let user_message = Message {
        id: Uuid::new_v4(),
        chat_id: chat.id,
        content: req.content.clone(),
        sender: Sender::User,
        timestamp: Utc::now(),
        sentiment: None,
    };
    state.db.save_message(&user_message).await?;

    // First message names the session.
    if chat.name == NEW_CHAT_NAME {
        state
            .db
            .rename_chat(chat.id, &chat_name_from_message(&req.content))
            .await?;
    }

    let turn = generate_reply(&state, &req.content).await?;

    state
        .db
        .set_message_sentiment(user_message.id, &turn.sentiment)
        .await?;

    let bot_message = Message {
        id: Uuid::new_v4(),
        chat_id: chat.id,
        content: turn.reply,
        sender: Sender::Bot,
        timestamp: Utc::now(),
        sentiment: None,
    };
    state.db.save_message(&bot_message).await?;

    state.db.touch_chat(chat.id).await?;

    Ok(Json(MessageResponse::from(bot_message)))
}

/// Runs the responder under the configured timeout, retrying once before
/// surfacing an upstream failure.
async fn generate_reply(state: &AppState, content: &str) -> Result<BotTurn, ApiFailure> {
    match invoke_responder(state, content).await {
        Ok(turn) => Ok(turn),
        Err(first) => {
            warn!("responder failed, retrying once: {first}");
            invoke_responder(state, content)
                .await
                .map_err(ApiFailure::Upstream)
        }
    }
}

async fn invoke_responder(state: &AppState, content: &str) -> Result<BotTurn, String> {
    match tokio::time::timeout(
        state.config.responder_timeout,
        state.responder.respond(content),
    )
    .await
    {
        Ok(Ok(turn)) => Ok(turn),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!(
            "responder timed out after {:?}",
            state.config.responder_timeout
        )),
    }
}
