//! # asyncts - asynchronous ThingSpeak client
//!
//! A callback-driven client for the ThingSpeak telemetry service, designed
//! for embedded systems with non-blocking TCP stacks. The library supports
//! `no_std` environments and needs no allocator.
//!
//! ## Features
//!
//! ### ThingSpeak Client
//! - Single-field, multi-field and raw channel updates
//! - Reads of single fields (text, float, int, long), status, timestamps and
//!   whole feed entries
//! - Exactly one result callback per exchange
//! - Busy gating, send-window flow control and activity timeouts
//!
//! ### HTTP/1.1 Framing
//! - Request serialization with body-derived `Content-Length`
//! - Incremental response parsing over arbitrary chunk boundaries
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! asyncts = "0.1.0"
//! ```
//!
//! ### Writing a Channel Update
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
//! fn on_write(code: ResultCode) {
//!     // ResultCode::Success once the server stored the entry
//! }
//!
//! let client = Client::new(Socket, Options::default());
//! client.on_write_response(on_write).unwrap();
//! client.write_field(1, 23.5f32, Some("WRITE_API_KEY")).unwrap();
//!
//! // Platform glue forwards socket events:
//! // client.on_connect(); client.on_data(bytes); client.on_ack(len, ms);
//! // client.on_disconnect(); client.poll(now_ms);
//! ```
//!
//! ## Platform Support
//!
//! This library is designed to work on:
//! - Embedded microcontrollers (ARM Cortex-M, RISC-V, Xtensa)
//! - Linux-based IoT devices
//! - Any platform supporting Rust's `core` library and `critical-section`
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Enable defmt logging support for embedded debugging

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Network abstraction layer: transport contract, buffers and protocol clients.
///
/// Contains the HTTP/1.1 framing layer and the ThingSpeak client built on it.
pub mod network;
