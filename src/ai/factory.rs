use std::sync::Arc;

use crate::ai::config::AiConfig;
use crate::ai::error::AiError;
use crate::ai::providers::{DisabledCompletionClient, GeminiCompletionClient};
use crate::ai::types::CompletionClient;

/// Build the completion client for `config`, or the disabled client when no
/// API key is set.
pub fn create_client(config: &AiConfig) -> Result<Arc<dyn CompletionClient>, AiError> {
    if config.effective_api_key().is_none() {
        tracing::warn!("GEMINI_API_KEY not set; AI analysis disabled");
        return Ok(Arc::new(DisabledCompletionClient));
    }

    let client = GeminiCompletionClient::new(config)?;
    tracing::info!(model = %client.model_id(), "gemini completion client initialized");
    Ok(Arc::new(client))
}
