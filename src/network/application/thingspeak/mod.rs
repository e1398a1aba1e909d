//! Asynchronous ThingSpeak client for embedded systems.
//!
//! This module drives one HTTP exchange at a time with the ThingSpeak
//! service over a non-blocking, notification-driven [`Transport`]. Writes
//! post channel updates; reads fetch the latest field values, status,
//! timestamps or a whole feed entry. Every exchange ends with exactly one
//! invocation of the registered result callback, never from inside the call
//! that issued it.
//!
//! # Key Features
//!
//! - Busy gate: while an exchange is in flight every new one is refused
//! - Request bodies built from one term list, so the declared
//!   `Content-Length` always matches the bytes sent
//! - Incremental response parsing over arbitrary chunk boundaries
//! - Sends limited to the transport's send window, resumed on acknowledge
//! - Fixed-capacity buffers, no allocator
//!
//! # Usage
//!
//! The platform owns the socket, implements [`Transport`] for it and forwards
//! socket notifications to the client's `on_*` methods and [`Client::poll`].
//!
//! ```rust,no_run
//! use asyncts::network::Transport;
//! use asyncts::network::application::thingspeak::{Client, Options, ResultCode};
//! # struct Socket;
//! # impl Transport for Socket {
//! #     type Error = ();
//! #     fn connect(&mut self, _host: &str, _port: u16) -> Result<(), ()> { Ok(()) }
//! #     fn is_connected(&self) -> bool { false }
//! #     fn can_send(&self) -> bool { true }
//! #     fn send_window(&self) -> usize { 1460 }
//! #     fn enqueue(&mut self, bytes: &[u8]) -> usize { bytes.len() }
//! #     fn send(&mut self) -> Result<(), ()> { Ok(()) }
//! #     fn close(&mut self) {}
//! #     fn set_rx_timeout(&mut self, _ms: u32) {}
//! #     fn set_ack_timeout(&mut self, _ms: u32) {}
//! # }
//!
//! fn written(code: ResultCode) {
//!     let _ = code.code();
//! }
//!
//! let client = Client::new(Socket, Options::default());
//! client.on_write_response(written).unwrap();
//! client.set_field(1, 23.5f32).unwrap();
//! client.set_status("warm").unwrap();
//! client.write_fields(Some("WRITE_API_KEY")).unwrap();
//! ```
//!
//! [`Transport`]: crate::network::Transport

/// Result codes for every exchange
pub mod error;

/// Form body construction and value encoding
pub mod form;

/// Values staged for a multi-field write
pub mod batch;

/// Last feed entry read
pub mod feed;

/// Response value extraction
pub mod extract;

/// Exchange lifecycle
pub mod session;

/// Result callbacks and read values
pub mod dispatch;

/// The client itself
pub mod client;

pub use batch::FieldBatch;
pub use client::Client;
pub use dispatch::{ReadCallback, ReadValue, WriteCallback};
pub use error::ResultCode;
pub use extract::{KeyScan, SerdeExtractor, ValueExtractor};
pub use feed::FeedSnapshot;
pub use form::FieldValue;
pub use session::State;

/// ThingSpeak API host.
pub const HOST: &str = "api.thingspeak.com";

/// Plain HTTP port.
pub const PORT: u16 = 80;

/// No activity for this long fails the exchange with [`ResultCode::Timeout`].
pub const DEFAULT_TIMEOUT_MS: u32 = 30_000;

/// Value of the `User-Agent` request header.
pub const USER_AGENT: &str = concat!("asyncts/", env!("CARGO_PKG_VERSION"));

/// Header carrying the channel API key.
pub const API_KEY_HEADER: &str = "X-THINGSPEAKAPIKEY";

/// Lowest field number.
pub const FIELD_NUM_MIN: u8 = 1;

/// Highest field number.
pub const FIELD_NUM_MAX: u8 = 8;

/// Number of fields in a channel.
pub const FIELD_COUNT: usize = 8;

/// Longest text value the service accepts, in bytes.
pub const MAX_FIELD_LEN: usize = 255;

/// Capacity of the outbound request buffer.
pub const REQUEST_CAPACITY: usize = 4096;

/// Capacity of the inbound response buffer.
pub const RESPONSE_CAPACITY: usize = 2048;

/// Connection and timing options.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Server host name.
    pub host: &'static str,

    /// Server port.
    pub port: u16,

    /// Receive/acknowledge timeout, and the longest an exchange may sit
    /// without activity.
    pub timeout_ms: u32,

    /// Sent as the `User-Agent` header.
    pub user_agent: &'static str,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            host: HOST,
            port: PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: USER_AGENT,
        }
    }
}
