//! A network abstraction layer for embedded systems
//!
//! This module provides the transport contract the protocol clients are built
//! on, the common transport error type and the fixed-capacity byte queue used
//! for request and response buffering.
//!
//! Unlike a blocking `read`/`write` socket, the transport modelled here is
//! callback-driven: the platform's TCP stack reports connect, acknowledge,
//! data, error and disconnect events, and the application protocol client
//! reacts to them. The [`Transport`] trait covers the calls a client makes
//! *into* the stack; the notifications travel the other way and are
//! forwarded by platform glue to the client's `on_*` methods.

#![allow(missing_docs)]
#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Fixed-capacity byte queue for streaming buffers
pub mod buffer;

/// Application layer protocol implementations
pub mod application;

/// Re-exports of common traits
pub mod prelude {
    pub use super::Transport;
    pub use super::buffer::ByteQueue;
    pub use super::error::Error;
}

/// A non-blocking, notification-driven TCP transport.
///
/// Every method returns immediately. Completion of `connect` is reported
/// later through the client's connect notification (or an error
/// notification), and bytes handed to `enqueue` are acknowledged through the
/// acknowledge notification once the peer has received them.
///
/// # Re-entrancy
///
/// `connect`, `send` and `close` may deliver notifications synchronously,
/// from inside the call: a connect notification from `connect`, acknowledge
/// or data notifications from `send`, a disconnect notification from `close`.
/// The client queues such notifications and handles them before the call
/// that triggered them returns. Apart from the `on_*` notifications and
/// `poll`, no client method may be called from inside a transport method.
pub trait Transport {
    /// Associated error type
    type Error: core::fmt::Debug;

    /// Start connecting to `host:port`.
    ///
    /// `Ok` means the attempt is under way, not that the connection is open.
    fn connect(&mut self, host: &str, port: u16) -> Result<(), Self::Error>;

    /// Whether the connection is currently open
    fn is_connected(&self) -> bool;

    /// Whether the stack is able to take more outbound bytes right now
    fn can_send(&self) -> bool;

    /// Number of bytes the stack will currently accept
    fn send_window(&self) -> usize;

    /// Queue bytes for transmission, returning how many were accepted
    fn enqueue(&mut self, bytes: &[u8]) -> usize;

    /// Push queued bytes onto the wire
    fn send(&mut self) -> Result<(), Self::Error>;

    /// Close the connection. A disconnect notification follows, possibly
    /// before `close` returns.
    fn close(&mut self);

    /// Receive timeout: no inbound data for this long is an error
    fn set_rx_timeout(&mut self, milliseconds: u32);

    /// Acknowledge timeout for the last sent segment
    fn set_ack_timeout(&mut self, milliseconds: u32);
}
