pub mod domain;
pub mod ports;

pub use domain::{
    anonymous_email, chat_name_from_message, BotTurn, ChatSession, Message, Mood, MoodEntry,
    Sender, Sentiment, SentimentLabel, User, NEW_CHAT_NAME,
};
pub use ports::{DatabaseService, PortError, PortResult, ResponderService};
