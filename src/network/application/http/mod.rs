//! HTTP/1.1 framing for embedded systems.
//!
//! This module provides the two halves of a minimal HTTP/1.1 client exchange,
//! written for `no_std` environments and streaming transports:
//!
//! - [`request`]: serializes a request line, headers and an optional body
//!   into a byte queue. The `Content-Length` header is derived from the body
//!   itself, so the declared and the emitted length cannot disagree.
//! - [`response`]: an incremental assembler that consumes inbound chunks as
//!   they arrive, recognizes the status line, `Content-Length` and the end of
//!   the header block, and reports when the declared body is fully buffered.
//!
//! Only what a telemetry client needs is interpreted: no chunked transfer,
//! redirects or header storage.
//!
//! # Usage
//!
//! ```rust
//! use asyncts::network::application::http::request::{Header, Method, Request};
//! use asyncts::network::application::http::response::{Progress, ResponseAssembler};
//! use asyncts::network::buffer::ByteQueue;
//!
//! let mut out: ByteQueue<256> = ByteQueue::new();
//! let headers = [Header { name: "Host", value: "api.thingspeak.com" }];
//! let request = Request {
//!     method: Method::Get,
//!     target: &"/channels/1/feeds/last.txt",
//!     headers: &headers,
//!     body: None,
//! };
//! request.write_to(&mut out).unwrap();
//!
//! let mut response: ResponseAssembler<256> = ResponseAssembler::new();
//! let progress = response
//!     .push(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok")
//!     .unwrap();
//! assert_eq!(progress, Progress::Complete);
//! assert_eq!(response.status(), Some(200));
//! ```

/// Request serialization.
pub mod request;

/// Incremental response parsing.
pub mod response;
