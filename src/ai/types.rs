use async_trait::async_trait;
use serde::Serialize;

use crate::ai::error::AiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// A text-in, text-out language model.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    fn model_id(&self) -> String;
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;

    /// Reply to the last turn of `turns`, with the earlier ones as context.
    ///
    /// Clients without native multi-turn support see the conversation as a
    /// single transcript prompt.
    async fn converse(&self, turns: &[ChatTurn]) -> Result<String, AiError> {
        let transcript = turns
            .iter()
            .map(|turn| format!("{}: {}", turn.role.as_str(), turn.text))
            .collect::<Vec<_>>()
            .join("\n\n");
        self.generate(&transcript).await
    }
}
