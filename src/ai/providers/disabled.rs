use async_trait::async_trait;

use crate::ai::error::AiError;
use crate::ai::types::CompletionClient;

/// Stand-in used when no API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCompletionClient;

#[async_trait]
impl CompletionClient for DisabledCompletionClient {
    fn model_id(&self) -> String {
        "disabled".to_string()
    }

    async fn generate(&self, _prompt: &str) -> Result<String, AiError> {
        Err(AiError::Config(
            "no AI API key configured (set GEMINI_API_KEY)".to_string(),
        ))
    }
}
