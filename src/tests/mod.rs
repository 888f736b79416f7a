//! Cross-module scenarios: publishers, sessions and the HTTP surface wired
//! together over one shared bus.

mod streaming;

use std::sync::Arc;
use std::time::Duration;

use crate::ai::providers::DisabledCompletionClient;
use crate::bus::EventBus;
use crate::config::StreamConfig;
use crate::db::Database;
use crate::stream::{Frame, StreamSession};
use crate::AppState;

pub(crate) fn stream_config(max_duration_ms: u64, max_events: usize, idle_ms: u64) -> StreamConfig {
    StreamConfig {
        max_duration: Duration::from_millis(max_duration_ms),
        max_events,
        idle_interval: Duration::from_millis(idle_ms),
    }
}

/// App state over an in-memory database with AI disabled.
pub(crate) fn test_state(stream: StreamConfig) -> AppState {
    let db = Arc::new(Database::open_in_memory().expect("in-memory DB"));
    AppState::new(
        db,
        Arc::new(EventBus::new()),
        Arc::new(DisabledCompletionClient),
        stream,
    )
}

/// Run a session to completion and collect every frame it yields.
pub(crate) async fn drain(mut session: StreamSession) -> Vec<Frame> {
    let mut frames = Vec::new();
    while let Some(frame) = session.next_frame().await {
        frames.push(frame);
    }
    frames
}
