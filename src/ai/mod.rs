//! AI-assisted incident analysis, resource recommendations and chat.
//!
//! A [`CompletionClient`] turns a prompt into text. [`service`] builds the
//! prompts and degrades gracefully when the model is unavailable or replies
//! with something unparsable. [`chat`] keeps per-user conversations.

pub mod chat;
pub mod config;
pub mod error;
pub mod factory;
pub mod providers;
pub mod service;
pub mod types;

pub use chat::ChatSessions;
pub use config::AiConfig;
pub use error::AiError;
pub use factory::create_client;
pub use service::{analyze_incident, recommend_resources};
pub use types::{ChatRole, ChatTurn, CompletionClient};
