//! services/api/src/adapters/reply_llm.rs
//!
//! This module contains the adapter for the model-backed responder.
//! It implements the `ResponderService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use companion_core::domain::{BotTurn, Sentiment, SentimentLabel};
use companion_core::ports::{PortError, PortResult, ResponderService};

const SYSTEM_INSTRUCTIONS: &str = "You are a supportive mental-health companion. \
Respond to the user's message with warmth and without giving directives or medical advice: \
reflect what they said, validate the feeling, and invite them to keep talking. \
Keep the reply to one to three sentences of plain conversational prose. \
At the VERY END of your response, on a new final line, write EXACTLY: \
SENTIMENT: <label> <score> \
where <label> is one of positive, negative, neutral describing the USER'S message, \
and <score> is a number between -1.0 and 1.0.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ResponderService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiReplyAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiReplyAdapter {
    /// Creates a new `OpenAiReplyAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

/// Splits the trailing `SENTIMENT: <label> <score>` line off a raw completion.
/// A completion without a parseable trailer degrades to a neutral judgment.
fn split_sentiment_trailer(raw: &str) -> (String, Sentiment) {
    let mut lines: Vec<&str> = raw.lines().collect();
    let sentiment = match lines.last() {
        Some(last) if last.trim().starts_with("SENTIMENT:") => {
            let rest = last.trim().trim_start_matches("SENTIMENT:").trim();
            let mut parts = rest.split_whitespace();
            let label = parts
                .next()
                .and_then(|s| s.parse::<SentimentLabel>().ok());
            let score = parts.next().and_then(|s| s.parse::<f64>().ok());
            lines.pop();
            match (label, score) {
                (Some(label), Some(score)) => Sentiment { score, label },
                _ => Sentiment::neutral(),
            }
        }
        _ => Sentiment::neutral(),
    };
    let reply = lines.join("\n").trim().to_string();
    (reply, sentiment)
}

//=========================================================================================
// `ResponderService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ResponderService for OpenAiReplyAdapter {
    async fn respond(&self, message: &str) -> PortResult<BotTurn> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Upstream(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(message)
                .build()
                .map_err(|e| PortError::Upstream(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(300u32)
            .temperature(0.7)
            .build()
            .map_err(|e| PortError::Upstream(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Upstream(e.to_string()))?;

        let raw = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PortError::Upstream("empty completion".to_string()))?;

        let (reply, sentiment) = split_sentiment_trailer(&raw);
        if reply.is_empty() {
            return Err(PortError::Upstream("completion had no reply text".to_string()));
        }
        Ok(BotTurn { reply, sentiment })
    }
}
