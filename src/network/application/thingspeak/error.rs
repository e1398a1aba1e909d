//! Result codes reported for every exchange

/// Outcome of an exchange, or the reason a call was refused.
///
/// Every exchange ends in exactly one of these, delivered through the
/// registered result callback. [`ResultCode::code`] gives the numeric value
/// used by the ThingSpeak device libraries, so codes can be logged or
/// forwarded in the same form other devices report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    /// The server accepted the request (HTTP 200).
    Success,
    /// Incorrect API key (HTTP 400).
    BadApiKey,
    /// Incorrect API key or server address (HTTP 404).
    BadAddress,
    /// Any other HTTP status the server answered with.
    HttpStatus(u16),
    /// A numeric value is out of range, or a text value is longer than 255 bytes.
    OutOfRange,
    /// The field number is outside 1..=8.
    InvalidFieldNumber,
    /// A multi-field write was issued with nothing set.
    MissingFields,
    /// The connection could not be opened, or the client is busy.
    ConnectFailed,
    /// The request could not be buffered, or the connection dropped mid-request.
    UnexpectedFail,
    /// The response could not be parsed.
    BadResponse,
    /// No response arrived within the configured timeout.
    Timeout,
    /// The server answered but did not insert the point (rate limit).
    NotInserted,
}

impl ResultCode {
    /// Map an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        match status {
            200 => ResultCode::Success,
            400 => ResultCode::BadApiKey,
            404 => ResultCode::BadAddress,
            other => ResultCode::HttpStatus(other),
        }
    }

    /// Numeric form: HTTP statuses as-is, local failures negative.
    pub fn code(&self) -> i32 {
        match self {
            ResultCode::Success => 200,
            ResultCode::BadApiKey => 400,
            ResultCode::BadAddress => 404,
            ResultCode::HttpStatus(status) => i32::from(*status),
            ResultCode::OutOfRange => -101,
            ResultCode::InvalidFieldNumber => -201,
            ResultCode::MissingFields => -210,
            ResultCode::ConnectFailed => -301,
            ResultCode::UnexpectedFail => -302,
            ResultCode::BadResponse => -303,
            ResultCode::Timeout => -304,
            ResultCode::NotInserted => -401,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == ResultCode::Success
    }

    /// 400 and 404 both mean the key or the address is wrong.
    pub fn is_bad_credentials(&self) -> bool {
        matches!(self, ResultCode::BadApiKey | ResultCode::BadAddress)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ResultCode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ResultCode::Success => defmt::write!(f, "Success"),
            ResultCode::BadApiKey => defmt::write!(f, "BadApiKey"),
            ResultCode::BadAddress => defmt::write!(f, "BadAddress"),
            ResultCode::HttpStatus(status) => defmt::write!(f, "HttpStatus({})", status),
            ResultCode::OutOfRange => defmt::write!(f, "OutOfRange"),
            ResultCode::InvalidFieldNumber => defmt::write!(f, "InvalidFieldNumber"),
            ResultCode::MissingFields => defmt::write!(f, "MissingFields"),
            ResultCode::ConnectFailed => defmt::write!(f, "ConnectFailed"),
            ResultCode::UnexpectedFail => defmt::write!(f, "UnexpectedFail"),
            ResultCode::BadResponse => defmt::write!(f, "BadResponse"),
            ResultCode::Timeout => defmt::write!(f, "Timeout"),
            ResultCode::NotInserted => defmt::write!(f, "NotInserted"),
        }
    }
}
