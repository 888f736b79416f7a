//! CrisisConnect backend library.
//!
//! Incident reporting and resource coordination with a live event feed.
//! Handlers persist changes to SQLite and publish small JSON notices onto an
//! in-process bus; browsers drain the bus through short-lived SSE sessions
//! and reconnect when a session ends.
//!
//! # Architecture
//!
//! - `bus`: channel catalogue, per-channel queues and the publisher
//! - `stream`: SSE frames and the bounded stream session
//! - `http`: axum router and handlers
//! - `db`: SQLite persistence
//! - `ai`: Gemini-backed incident analysis and chat assistant
//! - `core`: shared vocabularies and formatting helpers
//! - `config`: environment-driven settings

pub mod ai;
pub mod bus;
pub mod config;
pub mod core;
pub mod db;
pub mod http;
pub mod stream;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use ai::{ChatSessions, CompletionClient};
use bus::{EventBus, Publisher};
use config::{AppConfig, StreamConfig};
use db::Database;

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Db(#[from] db::DbError),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::Db(db::DbError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Db(db::DbError::Conflict(_)) => StatusCode::CONFLICT,
            AppError::Db(_) | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Db(db::DbError::Conflict(message)) => message.clone(),
            other => other.to_string(),
        };
        if status.is_server_error() {
            tracing::error!("request failed: {message}");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// App state (shared across handlers)
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub bus: Arc<EventBus>,
    pub publisher: Publisher,
    pub ai: Arc<dyn CompletionClient>,
    pub chat: Arc<ChatSessions>,
    pub stream: StreamConfig,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        bus: Arc<EventBus>,
        ai: Arc<dyn CompletionClient>,
        stream: StreamConfig,
    ) -> Self {
        let publisher = Publisher::new(bus.clone());
        Self {
            db,
            bus,
            publisher,
            ai,
            chat: Arc::new(ChatSessions::new()),
            stream,
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Load configuration, open the database and serve until Ctrl-C.
pub async fn run() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("crisisconnect=debug,info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| AppError::Other(e.to_string()))?;

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Other(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
    }
    let db = Arc::new(Database::open(&config.database_path)?);
    tracing::info!(path = %config.database_path.display(), "database ready");

    let ai: Arc<dyn CompletionClient> = match ai::create_client(&config.ai) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("AI client unavailable, analysis disabled: {e}");
            Arc::new(ai::providers::DisabledCompletionClient)
        }
    };

    let bus = Arc::new(EventBus::new());
    let state = AppState::new(db, bus, ai, config.stream);
    let app = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| AppError::Other(format!("failed to bind {}: {e}", config.bind_addr)))?;
    tracing::info!(addr = %config.bind_addr, "crisisconnect listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Other(format!("server error: {e}")))?;

    tracing::info!("crisisconnect stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
