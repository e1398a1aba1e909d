//! Result callbacks
//!
//! Callbacks are plain function pointers. The client copies the registered
//! pointer and the outcome out of its critical section and only then calls
//! it, so a callback may call back into the client.
//!
//! Issuing the next exchange from a callback works once the session is idle.
//! That is the case when the transport reports the disconnect from inside
//! `close`, or when the connection was already gone. A transport that closes
//! asynchronously leaves the session in `Closing` until its disconnect
//! notification, and an exchange issued before that is refused with
//! `ConnectFailed`.

use heapless::String;

use super::RESPONSE_CAPACITY;
use super::error::ResultCode;
use super::feed::FeedSnapshot;
use super::session::Extraction;

/// Called once per write exchange.
pub type WriteCallback = fn(ResultCode);

/// Called once per read exchange, with the value read.
pub type ReadCallback = fn(ResultCode, &ReadValue);

/// A value produced by a read exchange.
///
/// Failed reads carry the default for their kind: an empty string, zero,
/// or the previous feed snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadValue {
    /// Raw body, a string field, `created_at` or `status`.
    Text(String<RESPONSE_CAPACITY>),
    /// A field read with [`read_float_field`](super::Client::read_float_field).
    Float(f32),
    /// A field read with [`read_int_field`](super::Client::read_int_field).
    Int(i32),
    /// A field read with [`read_long_field`](super::Client::read_long_field).
    Long(i64),
    /// A whole feed entry.
    Feed(FeedSnapshot),
}

impl ReadValue {
    /// The value a failed read of this kind reports.
    pub(crate) fn empty(extraction: Extraction, last_feed: &FeedSnapshot) -> Self {
        match extraction {
            Extraction::Raw | Extraction::CreatedAt | Extraction::Status => {
                ReadValue::Text(String::new())
            }
            Extraction::Float => ReadValue::Float(0.0),
            Extraction::Int => ReadValue::Int(0),
            Extraction::Long => ReadValue::Long(0),
            Extraction::Feed => ReadValue::Feed(last_feed.clone()),
        }
    }

    /// The text, for raw, string, status and timestamp reads.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ReadValue::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            ReadValue::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            ReadValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            ReadValue::Long(value) => Some(*value),
            _ => None,
        }
    }

    /// The entry, for multi-field reads.
    pub fn as_feed(&self) -> Option<&FeedSnapshot> {
        match self {
            ReadValue::Feed(feed) => Some(feed),
            _ => None,
        }
    }
}

/// A callback invocation waiting for the critical section to be released.
#[derive(Debug)]
pub enum Dispatch {
    Write {
        callback: Option<WriteCallback>,
        code: ResultCode,
    },
    Read {
        callback: Option<ReadCallback>,
        code: ResultCode,
        value: ReadValue,
    },
}

impl Dispatch {
    pub fn code(&self) -> ResultCode {
        match self {
            Dispatch::Write { code, .. } | Dispatch::Read { code, .. } => *code,
        }
    }

    /// Invoke the callback. Without one the outcome is dropped.
    pub fn fire(self) {
        match self {
            Dispatch::Write {
                callback: Some(callback),
                code,
            } => callback(code),
            Dispatch::Read {
                callback: Some(callback),
                code,
                value,
            } => callback(code, &value),
            _ => {}
        }
    }
}
