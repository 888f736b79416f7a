//! In-process event bus for live dashboard updates.
//!
//! The bus provides:
//! - A fixed catalogue of channels (`new-incident`, `incident-update`,
//!   `resource-allocation`, `status-change`)
//! - One unbounded FIFO queue per channel with non-blocking dequeue
//! - A `Publisher` handle that request handlers use after committing a write
//!
//! # Delivery model
//!
//! Queues are shared by every stream session watching a channel. Each event
//! goes to whichever session dequeues it first; there is no per-subscriber
//! copy, no persistence and no replay for late subscribers.

mod channel;
mod error;
mod event_bus;
mod publisher;

pub use channel::{Channel, ChannelSelector, ALL_CHANNELS};
pub use error::BusError;
pub use event_bus::{BusEvent, EventBus};
pub use publisher::Publisher;
