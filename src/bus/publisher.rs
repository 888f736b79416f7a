use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;

use super::{BusError, Channel, EventBus};

/// Enqueue-only handle onto the bus, used by request handlers after their
/// primary write has committed.
///
/// Publishing never fails loudly: problems are logged and reported as
/// `false` so the caller's own operation is unaffected.
#[derive(Clone)]
pub struct Publisher {
    bus: Arc<EventBus>,
}

impl Publisher {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    /// Publish `payload` on the channel named `channel`.
    pub fn publish<T: Serialize + ?Sized>(&self, payload: &T, channel: &str) -> bool {
        match Channel::from_str(channel) {
            Ok(channel) => self.publish_to(channel, payload),
            Err(e) => {
                tracing::error!("invalid event channel {channel:?}: {e}");
                false
            }
        }
    }

    /// Publish on the default channel (`new-incident`).
    pub fn publish_default<T: Serialize + ?Sized>(&self, payload: &T) -> bool {
        self.publish_to(Channel::default(), payload)
    }

    pub fn publish_to<T: Serialize + ?Sized>(&self, channel: Channel, payload: &T) -> bool {
        let value = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                let err = BusError::Payload(e.to_string());
                tracing::error!("dropping event for {channel}: {err}");
                return false;
            }
        };
        let event = self.bus.enqueue(channel, value);
        tracing::debug!(
            channel = %channel,
            seq = event.seq,
            event_id = %event.id,
            "event published"
        );
        true
    }
}
