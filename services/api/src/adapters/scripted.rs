//! services/api/src/adapters/scripted.rs
//!
//! The default responder: a fixed set of supportive, non-directive phrases
//! and a neutral sentiment judgment. Stands in for a real model behind the
//! same port, so the message-send path is identical either way.

use async_trait::async_trait;
use companion_core::domain::{BotTurn, Sentiment};
use companion_core::ports::{PortResult, ResponderService};
use rand::seq::SliceRandom;

pub const SUPPORTIVE_REPLIES: [&str; 10] = [
    "I understand how you're feeling. Would you like to talk more about that?",
    "Thank you for sharing that with me. How long have you been feeling this way?",
    "That sounds challenging. What helps you cope when you feel like this?",
    "I'm here to listen. Would you like to explore some techniques that might help?",
    "Your feelings are valid. It takes courage to express them.",
    "I hear you. Sometimes just talking about our feelings can help us process them better.",
    "Would you like to try a quick mindfulness exercise to help center yourself?",
    "It sounds like you're going through a lot. Remember to be kind to yourself during this time.",
    "Have you spoken to anyone else about how you're feeling?",
    "I'm glad you reached out today. Is there anything specific you'd like support with?",
];

pub struct ScriptedResponder;

#[async_trait]
impl ResponderService for ScriptedResponder {
    async fn respond(&self, _message: &str) -> PortResult<BotTurn> {
        let reply = SUPPORTIVE_REPLIES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(SUPPORTIVE_REPLIES[0]);
        Ok(BotTurn {
            reply: reply.to_string(),
            sentiment: Sentiment::neutral(),
        })
    }
}
