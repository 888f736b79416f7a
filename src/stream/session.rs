use std::sync::Arc;

use futures::Stream;
use tokio::time::Instant;
use uuid::Uuid;

use super::Frame;
use crate::bus::{BusError, Channel, ChannelSelector, EventBus};
use crate::config::StreamConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Streaming,
    DrainingIdle,
    Closing,
    Closed,
}

/// One client's time- and count-boxed view of the bus.
///
/// The session yields frames through [`StreamSession::next_frame`] until its
/// duration or event budget runs out, then emits a closing notice and ends.
/// Clients are expected to reconnect right away; delivery across sessions is
/// continuous only as long as they do.
///
/// Dropping the session before it closes (the client went away) simply
/// releases its hold on the bus. No frame is owed to a gone client.
pub struct StreamSession {
    id: String,
    bus: Arc<EventBus>,
    config: StreamConfig,
    requested: String,
    watched: Vec<Channel>,
    state: SessionState,
    started_at: Instant,
    delivered: usize,
    cursor: usize,
    found_in_sweep: bool,
    keepalive_sent: bool,
}

impl StreamSession {
    pub fn open(bus: Arc<EventBus>, selector: &str, config: StreamConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            bus,
            config,
            requested: selector.to_string(),
            watched: Vec::new(),
            state: SessionState::Starting,
            started_at: Instant::now(),
            delivered: 0,
            cursor: 0,
            found_in_sweep: false,
            keepalive_sent: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Event frames emitted so far.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn watched(&self) -> &[Channel] {
        &self.watched
    }

    /// Produce the next frame, or `None` once the session is closed.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        loop {
            match self.state {
                SessionState::Starting => return Some(self.start()),
                SessionState::Streaming => {
                    if let Some(frame) = self.sweep() {
                        return Some(frame);
                    }
                }
                SessionState::DrainingIdle => {
                    if !self.keepalive_sent {
                        self.keepalive_sent = true;
                        return Some(Frame::keepalive());
                    }
                    self.keepalive_sent = false;
                    self.pause().await;
                    self.state = SessionState::Streaming;
                }
                SessionState::Closing => {
                    self.state = SessionState::Closed;
                    tracing::debug!(
                        session = %self.id,
                        delivered = self.delivered,
                        elapsed_ms = self.started_at.elapsed().as_millis() as u64,
                        "stream session closing"
                    );
                    return Some(Frame::closing());
                }
                SessionState::Closed => return None,
            }
        }
    }

    /// Turn the session into a stream of frames for a response body.
    pub fn into_stream(self) -> impl Stream<Item = Frame> + Send + 'static {
        futures::stream::unfold(self, |mut session| async move {
            session.next_frame().await.map(|frame| (frame, session))
        })
    }

    fn start(&mut self) -> Frame {
        match ChannelSelector::parse(&self.requested) {
            Ok(selector) => {
                self.watched = selector.channels();
                self.started_at = Instant::now();
                self.delivered = 0;
                self.state = SessionState::Streaming;
                tracing::debug!(session = %self.id, channel = %selector, "stream session opened");
                Frame::connected()
            }
            Err(e) => {
                tracing::warn!(session = %self.id, "rejecting stream subscription: {e}");
                self.state = SessionState::Closed;
                Frame::error(e.to_string())
            }
        }
    }

    /// Wait out one idle interval, ending early only once a watched queue
    /// has something to take.
    async fn pause(&self) {
        let deadline = Instant::now() + self.config.idle_interval;
        loop {
            if self.watched.iter().any(|channel| !self.bus.is_empty(*channel)) {
                return;
            }
            let wakeups = self
                .watched
                .iter()
                .map(|channel| Box::pin(self.bus.published(*channel)));
            let woken = tokio::time::timeout_at(deadline, futures::future::select_all(wakeups)).await;
            if woken.is_err() {
                return;
            }
        }
    }

    fn time_remaining(&self) -> bool {
        self.started_at.elapsed() < self.config.max_duration
    }

    /// Advance the current sweep over the watched queues.
    ///
    /// Returns a frame as soon as one is available. Returns `None` after
    /// updating `state` when the sweep completes or the budget runs out.
    fn sweep(&mut self) -> Option<Frame> {
        if self.cursor == 0 && !self.time_remaining() {
            self.state = SessionState::Closing;
            return None;
        }

        while self.cursor < self.watched.len() {
            if self.delivered >= self.config.max_events {
                self.cursor = 0;
                self.found_in_sweep = false;
                self.state = SessionState::Closing;
                return None;
            }

            let channel = self.watched[self.cursor];
            self.cursor += 1;
            match self.bus.try_dequeue(channel) {
                Ok(event) => {
                    self.found_in_sweep = true;
                    self.delivered += 1;
                    tracing::trace!(
                        session = %self.id,
                        channel = %channel,
                        seq = event.seq,
                        "forwarding event"
                    );
                    return Some(Frame::event(&event));
                }
                Err(BusError::Empty(_)) => {}
                Err(e) => {
                    tracing::error!(session = %self.id, "error in event stream: {e}");
                    return Some(Frame::error(e.to_string()));
                }
            }
        }

        self.cursor = 0;
        if !std::mem::take(&mut self.found_in_sweep) {
            self.state = SessionState::DrainingIdle;
        }
        None
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            tracing::debug!(
                session = %self.id,
                delivered = self.delivered,
                "stream session dropped before closing (client disconnected)"
            );
        }
    }
}
