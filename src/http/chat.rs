use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::now_rfc3339;
use crate::db::queries;
use crate::{AppError, AppState};

const CONNECTIVITY_PROMPT: &str = "Hello, are you working?";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub user_id: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub is_new_chat: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub timestamp: String,
}

pub async fn chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if body.message.trim().is_empty() {
        return Err(AppError::Validation("No message provided".to_string()));
    }
    queries::get_user(&state.db, body.user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", body.user_id)))?;

    let response = state
        .chat
        .reply(state.ai.as_ref(), Some(body.user_id), &body.message, body.is_new_chat)
        .await;
    Ok(Json(ChatResponse {
        response,
        timestamp: now_rfc3339(),
    }))
}

/// Round-trip a fixed message through the assistant.
pub async fn check_ai(State(state): State<AppState>) -> Json<Value> {
    match state
        .chat
        .send(state.ai.as_ref(), None, CONNECTIVITY_PROMPT, true)
        .await
    {
        Ok(response) => Json(json!({
            "status": "ok",
            "message": "Gemini API is working",
            "model": state.ai.model_id(),
            "response": response,
        })),
        Err(e) => Json(json!({ "status": "error", "message": e.to_string() })),
    }
}
