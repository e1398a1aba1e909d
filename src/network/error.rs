//! Common error types for network operations

/// Errors a transport reports through its error notification.
///
/// Platform glue translates its TCP stack's error codes into this enum before
/// forwarding them to a protocol client. [`Error::from_lwip`] covers the
/// lwIP `err_t` values used by most embedded TCP stacks.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The stack ran out of memory or buffer space.
    OutOfMemory,
    /// No data or acknowledgement arrived within the configured timeout.
    Timeout,
    /// No route to the remote host.
    Unreachable,
    /// The connection attempt was refused or could not be established.
    ConnectionRefused,
    /// The connection was aborted locally.
    ConnectionAborted,
    /// The connection was reset by the peer.
    ConnectionReset,
    /// The connection is already closed.
    ConnectionClosed,
    /// The host name could not be resolved.
    InvalidAddress,
    /// Any other stack-specific error code.
    Other(i8),
}

impl Error {
    /// Map an lwIP `err_t` code onto a transport error.
    pub fn from_lwip(code: i8) -> Self {
        match code {
            -1 | -2 => Error::OutOfMemory,
            -3 => Error::Timeout,
            -4 => Error::Unreachable,
            -11 => Error::ConnectionRefused,
            -13 => Error::ConnectionAborted,
            -14 => Error::ConnectionReset,
            -15 => Error::ConnectionClosed,
            -16 => Error::InvalidAddress,
            other => Error::Other(other),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::OutOfMemory => defmt::write!(f, "OutOfMemory"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::Unreachable => defmt::write!(f, "Unreachable"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::ConnectionAborted => defmt::write!(f, "ConnectionAborted"),
            Error::ConnectionReset => defmt::write!(f, "ConnectionReset"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::Other(code) => defmt::write!(f, "Other({})", code),
        }
    }
}
