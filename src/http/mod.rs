//! HTTP surface: the SSE stream, its probe, and the JSON API whose writes
//! feed the bus.

mod chat;
mod dashboard;
mod incidents;
mod resources;
mod stream;
mod users;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub use stream::{PING_STATUS, STREAM_CONTENT_TYPE};

pub fn build_router(state: AppState) -> Router {
    let stream_routes = Router::new()
        .route("/ping", get(stream::ping))
        .route("/stream", get(stream::stream));

    let api_routes = Router::new()
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{id}", get(users::get_user).put(users::update_user))
        .route(
            "/incidents",
            get(incidents::list_incidents).post(incidents::report_incident),
        )
        .route("/incidents/{id}", get(incidents::get_incident))
        .route("/incidents/{id}/updates", post(incidents::add_update))
        .route(
            "/incidents/{id}/recommend-resources",
            get(incidents::recommend_resources),
        )
        .route(
            "/resources",
            get(resources::list_resources).post(resources::create_resource),
        )
        .route("/resources/{id}/verify", post(resources::verify_resource))
        .route("/allocations", post(resources::allocate_resource))
        .route("/map-data", get(resources::map_data))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/chat", post(chat::chat))
        .route("/test/gemini", get(chat::check_ai));

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .nest("/stream", stream_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Current time as stored in the database.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Trimmed, non-empty copy of a required text field.
pub(crate) fn required_text(value: &str, field: &str) -> Result<String, crate::AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(crate::AppError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Blank optional strings are stored as NULL.
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
