pub mod db;
pub mod reply_llm;
pub mod scripted;

pub use db::DbAdapter;
pub use reply_llm::OpenAiReplyAdapter;
pub use scripted::ScriptedResponder;
