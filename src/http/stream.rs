use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use axum::Json;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::bus::ALL_CHANNELS;
use crate::stream::StreamSession;
use crate::AppState;

pub const STREAM_CONTENT_TYPE: &str = "text/event-stream";
pub const PING_STATUS: &str = "SSE service operational";

#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_channel() -> String {
    ALL_CHANNELS.to_string()
}

pub async fn ping() -> Json<Value> {
    Json(json!({ "status": PING_STATUS }))
}

/// Open one bounded stream session and send its frames as the body.
///
/// The body ends when the session closes; if the client goes away first the
/// body stream, and with it the session, is dropped.
pub async fn stream(State(state): State<AppState>, Query(query): Query<StreamQuery>) -> Response {
    let session = StreamSession::open(state.bus.clone(), &query.channel, state.stream);
    tracing::debug!(session = %session.id(), channel = %query.channel, "stream requested");

    let body = session
        .into_stream()
        .map(|frame| Ok::<_, Infallible>(frame.encode()));

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(STREAM_CONTENT_TYPE)),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (
                header::HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        Body::from_stream(body),
    )
        .into_response()
}
