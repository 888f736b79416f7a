//! Conversational assistant with per-user history.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::ai::error::AiError;
use crate::ai::types::{ChatTurn, CompletionClient};

const PERSONA_PROMPT: &str = "You are CrisisConnect Assistant, an AI helper for a disaster response \
     platform. Your expertise is in emergency management, disaster response, and crisis \
     coordination. You're helpful, empathetic, and focused on providing practical advice for \
     disaster situations. Please introduce yourself briefly.";

const PERSONA_GREETING: &str = "Hello! I'm the CrisisConnect Assistant, here to help with disaster \
     response and emergency management questions. I can provide information about emergency \
     preparedness, disaster response protocols, resource coordination, and crisis management. \
     How can I help you today with emergency or disaster-related matters?";

pub const UNAVAILABLE_REPLY: &str =
    "I'm sorry, the AI assistant is currently unavailable. Please try again later.";

/// Conversation turns kept per user, not counting the two seed turns.
const MAX_HISTORY_TURNS: usize = 40;

fn seed() -> Vec<ChatTurn> {
    vec![ChatTurn::user(PERSONA_PROMPT), ChatTurn::model(PERSONA_GREETING)]
}

/// Chat histories keyed by user. `None` is the anonymous connectivity check.
#[derive(Default)]
pub struct ChatSessions {
    histories: Mutex<HashMap<Option<i64>, Vec<ChatTurn>>>,
}

impl ChatSessions {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Option<i64>, Vec<ChatTurn>>> {
        self.histories
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Turns stored for `user_id`, seed included.
    pub fn history(&self, user_id: Option<i64>) -> Vec<ChatTurn> {
        self.lock().get(&user_id).cloned().unwrap_or_default()
    }

    /// Send `message` in `user_id`'s conversation and return the model's reply.
    ///
    /// A new chat (or a user's first message) starts from the persona seed.
    /// The exchange is only recorded when the model answers.
    pub async fn send(
        &self,
        client: &dyn CompletionClient,
        user_id: Option<i64>,
        message: &str,
        is_new_chat: bool,
    ) -> Result<String, AiError> {
        let mut turns = {
            let mut histories = self.lock();
            if is_new_chat {
                histories.remove(&user_id);
            }
            histories.get(&user_id).cloned().unwrap_or_else(seed)
        };
        turns.push(ChatTurn::user(message));

        let reply = client.converse(&turns).await?;

        turns.push(ChatTurn::model(reply.clone()));
        let excess = turns.len().saturating_sub(MAX_HISTORY_TURNS + 2);
        if excess > 0 {
            turns.drain(2..2 + excess);
        }
        self.lock().insert(user_id, turns);
        Ok(reply)
    }

    /// Like [`ChatSessions::send`], with failures turned into a reply the
    /// user can read.
    pub async fn reply(
        &self,
        client: &dyn CompletionClient,
        user_id: Option<i64>,
        message: &str,
        is_new_chat: bool,
    ) -> String {
        match self.send(client, user_id, message, is_new_chat).await {
            Ok(reply) => reply,
            Err(AiError::Config(reason)) => {
                tracing::warn!("AI chat unavailable: {reason}");
                UNAVAILABLE_REPLY.to_string()
            }
            Err(e) => {
                tracing::error!(user = ?user_id, "error in chat conversation: {e}");
                format!("I'm sorry, I encountered an error: {e}. Please try again.")
            }
        }
    }
}
