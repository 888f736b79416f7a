use super::Channel;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("Invalid channel {0}")]
    UnknownChannel(String),
    #[error("no events queued on {0}")]
    Empty(Channel),
    #[error("queue fault on {channel}: {reason}")]
    QueueFault { channel: Channel, reason: String },
    #[error("payload is not JSON-serializable: {0}")]
    Payload(String),
}
