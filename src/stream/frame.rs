//! Server-Sent Events wire frames.

use serde_json::json;

use crate::bus::{BusEvent, Channel};

pub const CONNECTED_MESSAGE: &str = "Connected to CrisisConnect event stream";
pub const CLOSING_MESSAGE: &str = "Connection ended, client should reconnect";

/// One frame written to a streaming client.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// `data: <json>\n\n`, used for connection notices and errors.
    Data(serde_json::Value),
    /// `event: <channel>\ndata: <json payload>\n\n`.
    Event { channel: Channel, data: String },
}

impl Frame {
    pub fn connected() -> Self {
        Frame::Data(json!({ "message": CONNECTED_MESSAGE }))
    }

    pub fn keepalive() -> Self {
        Frame::Data(json!({ "keepalive": true }))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Frame::Data(json!({ "error": message.into() }))
    }

    pub fn closing() -> Self {
        Frame::Data(json!({ "message": CLOSING_MESSAGE }))
    }

    pub fn event(event: &BusEvent) -> Self {
        Frame::Event {
            channel: event.channel,
            data: event.payload.to_string(),
        }
    }

    pub fn is_event(&self) -> bool {
        matches!(self, Frame::Event { .. })
    }

    pub fn is_keepalive(&self) -> bool {
        matches!(self, Frame::Data(body) if body.get("keepalive").is_some())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Frame::Data(body) if body.get("error").is_some())
    }

    pub fn encode(&self) -> String {
        match self {
            Frame::Data(body) => format!("data: {body}\n\n"),
            Frame::Event { channel, data } => format!("event: {channel}\ndata: {data}\n\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::bus::EventBus;

    #[test]
    fn test_control_frames_encoding() {
        assert_eq!(
            Frame::connected().encode(),
            "data: {\"message\":\"Connected to CrisisConnect event stream\"}\n\n"
        );
        assert_eq!(Frame::keepalive().encode(), "data: {\"keepalive\":true}\n\n");
        assert_eq!(
            Frame::closing().encode(),
            "data: {\"message\":\"Connection ended, client should reconnect\"}\n\n"
        );
        assert_eq!(
            Frame::error("Invalid channel bogus-channel").encode(),
            "data: {\"error\":\"Invalid channel bogus-channel\"}\n\n"
        );
    }

    #[test]
    fn test_error_text_is_escaped() {
        let frame = Frame::error("bad \"quote\"\nline");
        assert_eq!(
            frame.encode(),
            "data: {\"error\":\"bad \\\"quote\\\"\\nline\"}\n\n"
        );
    }

    #[test]
    fn test_event_frame_carries_channel_label() {
        let bus = EventBus::new();
        let event = bus.enqueue(Channel::NewIncident, json!({ "id": 1 }));
        let frame = Frame::event(&event);

        assert!(frame.is_event());
        assert!(!frame.is_keepalive());
        assert_eq!(frame.encode(), "event: new-incident\ndata: {\"id\":1}\n\n");
    }

    #[test]
    fn test_frame_classification() {
        assert!(Frame::keepalive().is_keepalive());
        assert!(Frame::error("x").is_error());
        assert!(!Frame::connected().is_error());
        assert!(!Frame::closing().is_event());
    }
}
