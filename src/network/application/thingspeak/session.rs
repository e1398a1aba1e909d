//! Lifecycle of the single in-flight exchange

use super::error::ResultCode;
use super::{REQUEST_CAPACITY, RESPONSE_CAPACITY};
use crate::network::application::http::response::ResponseAssembler;
use crate::network::buffer::ByteQueue;

/// Where the current exchange stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No exchange; a new one may be issued.
    Idle,
    /// Waiting for the transport to open the connection.
    Connecting,
    /// Connected, request going out, response head not complete.
    Connected,
    /// The blank line ending the response head has been seen.
    HeadersReceived,
    /// Some, but not all, of the response body is buffered.
    BodyInProgress,
    /// The outcome is decided and not yet reported.
    Complete,
    /// The outcome is reported; waiting for the connection to go down.
    Closing,
}

impl State {
    /// An exchange is on the wire.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            State::Connected | State::HeadersReceived | State::BodyInProgress
        )
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for State {
    fn format(&self, f: defmt::Formatter) {
        match self {
            State::Idle => defmt::write!(f, "Idle"),
            State::Connecting => defmt::write!(f, "Connecting"),
            State::Connected => defmt::write!(f, "Connected"),
            State::HeadersReceived => defmt::write!(f, "HeadersReceived"),
            State::BodyInProgress => defmt::write!(f, "BodyInProgress"),
            State::Complete => defmt::write!(f, "Complete"),
            State::Closing => defmt::write!(f, "Closing"),
        }
    }
}

/// What a read does with the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// The whole body as text.
    Raw,
    Float,
    Int,
    Long,
    /// The `created_at` value of a feed entry.
    CreatedAt,
    /// The `status` value of a feed entry.
    Status,
    /// Every value of a feed entry.
    Feed,
}

/// Kind of the in-flight exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    Write,
    Read(Extraction),
}

/// State of the one exchange a client can have in flight.
#[derive(Debug)]
pub struct Session {
    state: State,
    exchange: Exchange,
    last_code: ResultCode,
    outcome: Option<ResultCode>,
    last_activity: Option<u32>,
    touched: bool,
    pub(crate) request: ByteQueue<REQUEST_CAPACITY>,
    pub(crate) response: ResponseAssembler<RESPONSE_CAPACITY>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub const fn new() -> Self {
        Self {
            state: State::Idle,
            exchange: Exchange::Write,
            last_code: ResultCode::Success,
            outcome: None,
            last_activity: None,
            touched: false,
            request: ByteQueue::new(),
            response: ResponseAssembler::new(),
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }

    /// Code of the most recently finished exchange.
    pub fn last_code(&self) -> ResultCode {
        self.last_code
    }

    /// Claim the session for a new exchange.
    ///
    /// This is the only way out of [`State::Idle`]. A busy session is left
    /// exactly as it is and the call fails with [`ResultCode::ConnectFailed`].
    pub fn begin(&mut self, exchange: Exchange) -> Result<(), ResultCode> {
        if !self.is_idle() {
            return Err(ResultCode::ConnectFailed);
        }
        self.state = State::Connecting;
        self.exchange = exchange;
        self.outcome = None;
        self.last_activity = None;
        self.touched = true;
        self.request.clear();
        self.response.reset();
        Ok(())
    }

    pub fn set_state(&mut self, state: State) {
        self.state = state;
    }

    /// Decide the outcome now and report it on the next poll.
    pub fn park(&mut self, code: ResultCode) {
        self.outcome = Some(code);
        self.state = State::Complete;
    }

    /// Take a parked outcome.
    pub fn take_outcome(&mut self) -> Option<ResultCode> {
        self.outcome.take()
    }

    /// Record the final code of the exchange.
    pub fn conclude(&mut self, code: ResultCode) {
        self.last_code = code;
        self.request.clear();
        self.state = State::Complete;
    }

    /// Back to [`State::Idle`].
    pub fn release(&mut self) {
        self.state = State::Idle;
        self.outcome = None;
        self.last_activity = None;
    }

    /// Note transport activity. The time is stamped by the next poll.
    pub fn touch(&mut self) {
        self.touched = true;
    }

    /// Whether `timeout_ms` has passed since the last activity.
    pub fn timed_out(&mut self, now_ms: u32, timeout_ms: u32) -> bool {
        let last = match self.last_activity {
            Some(last) if !self.touched => last,
            _ => {
                self.touched = false;
                self.last_activity = Some(now_ms);
                now_ms
            }
        };
        now_ms.wrapping_sub(last) >= timeout_ms
    }
}
