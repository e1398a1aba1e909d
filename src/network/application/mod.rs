//! # Application Layer Network Protocols
//!
//! This module contains the application layer (OSI Layer 7) protocols the
//! client speaks. Both are written against the notification-driven
//! [`Transport`](crate::network::Transport) contract.
//!
//! ## Available Protocols
//!
//! - **[`http`]**: HTTP/1.1 request serialization and incremental response parsing
//! - **[`thingspeak`]**: The ThingSpeak channel client
//!
//! ## Design Principles
//!
//! - **Transport Agnostic**: Work with any type implementing [`Transport`](crate::network::Transport)
//! - **No-std Compatible**: Fixed-size buffers, no heap allocation
//! - **Errors as Values**: Every failure is a result code, never a panic

/// HTTP/1.1 framing.
///
/// Request serialization with a body-derived `Content-Length` and an
/// incremental response assembler.
pub mod http;

/// ThingSpeak client.
///
/// Channel writes and reads over a single in-flight HTTP exchange.
pub mod thingspeak;
