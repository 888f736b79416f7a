use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::ai::config::AiConfig;
use crate::ai::error::AiError;
use crate::ai::types::{ChatTurn, CompletionClient};

pub struct GeminiCompletionClient {
    model: String,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
    timeout_ms: u64,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

impl GeminiCompletionClient {
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = config.effective_api_key().ok_or_else(|| {
            AiError::Config("gemini client requires an API key (set GEMINI_API_KEY)".to_string())
        })?;

        let model = config.model.trim();
        if model.is_empty() {
            return Err(AiError::Config("gemini model cannot be empty".to_string()));
        }

        if config.timeout_ms == 0 {
            return Err(AiError::Config(
                "gemini timeout must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            model: model.trim_start_matches("models/").to_string(),
            api_key,
            base_url: config.effective_base_url(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
                .map_err(|error| AiError::Config(error.to_string()))?,
            timeout_ms: config.timeout_ms,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate_content(&self, body: &GenerateContentRequest<'_>) -> Result<String, AiError> {
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|error| {
                if error.is_timeout() {
                    AiError::Timeout(format!(
                        "Gemini request timed out after {} ms",
                        self.timeout_ms
                    ))
                } else if error.is_connect() {
                    AiError::Request(format!(
                        "could not reach Gemini at {}: {error}",
                        self.base_url
                    ))
                } else {
                    AiError::Request(error.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AiError::Auth(
                "Gemini authentication failed. Check GEMINI_API_KEY".to_string(),
            ));
        }

        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AiError::Request(format!(
                "Gemini API returned {status}: {detail}"
            )));
        }

        let payload: serde_json::Value = response.json().await.map_err(|error| {
            AiError::InvalidResponse(format!("failed to parse Gemini response JSON: {error}"))
        })?;

        let parts = payload
            .pointer("/candidates/0/content/parts")
            .and_then(|value| value.as_array())
            .ok_or_else(|| {
                AiError::InvalidResponse(
                    "Gemini response missing 'candidates[0].content.parts'".to_string(),
                )
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|value| value.as_str()))
            .collect();
        if text.is_empty() {
            return Err(AiError::InvalidResponse(
                "Gemini response contained no text".to_string(),
            ));
        }

        tracing::debug!(model = %self.model, chars = text.len(), "gemini completion received");
        Ok(text)
    }
}

#[async_trait]
impl CompletionClient for GeminiCompletionClient {
    fn model_id(&self) -> String {
        self.model.clone()
    }

    async fn generate(&self, prompt: &str) -> Result<String, AiError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![TextPart { text: prompt }],
            }],
        };
        self.generate_content(&body).await
    }

    async fn converse(&self, turns: &[ChatTurn]) -> Result<String, AiError> {
        let body = GenerateContentRequest {
            contents: turns
                .iter()
                .map(|turn| Content {
                    role: Some(turn.role.as_str()),
                    parts: vec![TextPart { text: &turn.text }],
                })
                .collect(),
        };
        self.generate_content(&body).await
    }
}
