//! Short-lived event stream sessions.
//!
//! A session drains one channel (or all of them) for a bounded time and a
//! bounded number of events, writing SSE frames as it goes:
//!
//! ```text
//! STARTING -> STREAMING <-> DRAINING_IDLE -> CLOSING -> CLOSED
//! ```
//!
//! Sessions end on their own and tell the client to reconnect; a browser
//! `EventSource` does so automatically.

mod frame;
mod session;

pub use frame::{Frame, CLOSING_MESSAGE, CONNECTED_MESSAGE};
pub use session::{SessionState, StreamSession};
