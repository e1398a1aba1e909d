//! ThingSpeak channel client over a notification-driven transport.
//!
//! The [`Client`] runs one HTTP exchange at a time. An issuing call (a write
//! or a read) claims the session, serializes the request and asks the
//! transport to connect. From then on the exchange is driven entirely by the
//! notifications the platform forwards:
//!
//! - [`Client::on_connect`] starts sending the request
//! - [`Client::on_ack`] sends whatever the send window refused earlier
//! - [`Client::on_data`] feeds the response assembler
//! - [`Client::on_disconnect`] and [`Client::on_error`] end the exchange
//! - [`Client::poll`] enforces the activity timeout
//!
//! Exactly one result callback fires per exchange, always outside the
//! client's critical section.
//!
//! # Re-entrant notifications
//!
//! Many TCP stacks report events from inside the call that caused them, for
//! instance a disconnect from inside `close`. A notification that arrives
//! while the client is already working on behalf of the same context is
//! queued and handled, in arrival order, before the outer call returns.
//! Only the `on_*` notification methods and [`Client::poll`] may be called
//! from inside a [`Transport`] method.

use core::cell::RefCell;
use core::fmt::{self, Display, Write as _};

use critical_section::{CriticalSection, Mutex};
use heapless::{Deque, String, Vec};

use super::batch::FieldBatch;
use super::dispatch::{Dispatch, ReadCallback, ReadValue, WriteCallback};
use super::error::ResultCode;
use super::extract::{KeyScan, ValueExtractor, parse_float, parse_long};
use super::feed::{FeedSnapshot, bounded, clamp_i32};
use super::form::{FieldText, FieldValue, RawForm};
use super::session::{Exchange, Extraction, Session, State};
use super::{API_KEY_HEADER, FIELD_NUM_MAX, FIELD_NUM_MIN, Options, RESPONSE_CAPACITY};
use crate::network::Transport;
use crate::network::application::http::request::{Body, Header, Method, Request};
use crate::network::application::http::response::Progress;
use crate::network::buffer::ByteQueue;
use crate::network::error::Error;

const FEED_SUFFIX: &str = "/feeds/last.txt";
const FEED_DETAIL_SUFFIX: &str = "/feeds/last.txt?status=true&location=true";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Notifications that can wait while the client is locked.
const DEFERRED_CAPACITY: usize = 8;

/// Deferred data is handed to the assembler in pieces of this size.
const REPLAY_CHUNK: usize = 128;

/// `/channels/<id><suffix>`
struct ChannelPath<'a> {
    channel: u32,
    suffix: &'a str,
}

impl Display for ChannelPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/channels/{}{}", self.channel, self.suffix)
    }
}

/// A transport event.
#[derive(Debug, Clone, Copy)]
enum Notification<'a> {
    Connect,
    Disconnect,
    Error(Error),
    Data(&'a [u8]),
    Ack(usize, u32),
    Poll(u32),
}

enum Deferred {
    Event(Notification<'static>),
    /// This many bytes from the front of [`Pending::data`].
    Data(usize),
}

/// Notifications received while [`Inner`] was borrowed.
struct Pending {
    events: Deque<Deferred, DEFERRED_CAPACITY>,
    data: ByteQueue<RESPONSE_CAPACITY>,
    overflowed: bool,
}

impl Pending {
    const fn new() -> Self {
        Self {
            events: Deque::new(),
            data: ByteQueue::new(),
            overflowed: false,
        }
    }

    fn push(&mut self, notification: Notification<'_>) {
        if self.overflowed || self.events.is_full() {
            self.overflowed = true;
            return;
        }
        let deferred = match notification {
            Notification::Data(bytes) => {
                if self.data.append(bytes).is_err() {
                    self.overflowed = true;
                    return;
                }
                Deferred::Data(bytes.len())
            }
            Notification::Connect => Deferred::Event(Notification::Connect),
            Notification::Disconnect => Deferred::Event(Notification::Disconnect),
            Notification::Error(error) => Deferred::Event(Notification::Error(error)),
            Notification::Ack(len, elapsed_ms) => {
                Deferred::Event(Notification::Ack(len, elapsed_ms))
            }
            Notification::Poll(now_ms) => Deferred::Event(Notification::Poll(now_ms)),
        };
        // Capacity checked above.
        let _ = self.events.push_back(deferred);
    }

    /// Drop everything queued, reporting whether anything was lost.
    fn reset_overflow(&mut self) -> bool {
        if !self.overflowed {
            return false;
        }
        self.events.clear();
        self.data.clear();
        self.overflowed = false;
        true
    }
}

struct Inner<T, E> {
    transport: T,
    options: Options,
    session: Session,
    batch: FieldBatch,
    feed: FeedSnapshot,
    write_callback: Option<WriteCallback>,
    read_callback: Option<ReadCallback>,
    extractor: E,
    debug: bool,
}

/// A ThingSpeak client over a notification-driven transport.
///
/// All methods take `&self`; state lives behind a `critical_section` mutex,
/// so the client can be shared between the application and the context the
/// transport notifications arrive in. Result callbacks are always invoked
/// after the critical section is released.
///
/// Calls that start an exchange return `Ok(())` once the request is under
/// way. While another exchange is in flight they fail with
/// [`ResultCode::ConnectFailed`] and leave that exchange untouched. Any other
/// refusal parks the session in [`State::Complete`] and is reported to the
/// result callback on the next [`poll`](Self::poll).
pub struct Client<T: Transport, E: ValueExtractor = KeyScan> {
    inner: Mutex<RefCell<Inner<T, E>>>,
    pending: Mutex<RefCell<Pending>>,
}

impl<T: Transport> Client<T> {
    /// Create a client that extracts values with [`KeyScan`].
    pub fn new(transport: T, options: Options) -> Self {
        Self::with_extractor(transport, options, KeyScan)
    }
}

impl<T: Transport, E: ValueExtractor> Client<T, E> {
    /// Create a client with a custom value extractor.
    ///
    /// The transport's receive and acknowledge timeouts are set to
    /// `options.timeout_ms`.
    pub fn with_extractor(mut transport: T, options: Options, extractor: E) -> Self {
        transport.set_rx_timeout(options.timeout_ms);
        transport.set_ack_timeout(options.timeout_ms);
        Self {
            inner: Mutex::new(RefCell::new(Inner {
                transport,
                options,
                session: Session::new(),
                batch: FieldBatch::new(),
                feed: FeedSnapshot::default(),
                write_callback: None,
                read_callback: None,
                extractor,
                debug: false,
            })),
            pending: Mutex::new(RefCell::new(Pending::new())),
        }
    }

    fn lock<R>(&self, f: impl FnOnce(&mut Inner<T, E>) -> R) -> R {
        let (result, dispatch) = critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            let result = f(&mut inner);
            (result, self.drain(cs, &mut inner))
        });
        if let Some(dispatch) = dispatch {
            dispatch.fire();
        }
        result
    }

    /// Handle a notification now, or queue it if the client is busy on this context.
    fn notify(&self, notification: Notification<'_>) {
        let dispatch = critical_section::with(|cs| {
            let Ok(mut inner) = self.inner.borrow(cs).try_borrow_mut() else {
                self.pending.borrow_ref_mut(cs).push(notification);
                return None;
            };
            let dispatch = inner.handle(notification);
            let deferred = self.drain(cs, &mut inner);
            // An exchange concludes at most once.
            dispatch.or(deferred)
        });
        if let Some(dispatch) = dispatch {
            dispatch.fire();
        }
    }

    /// Handle the notifications queued while `inner` was borrowed.
    ///
    /// Handlers may queue further notifications; the loop runs until none is left.
    fn drain(&self, cs: CriticalSection<'_>, inner: &mut Inner<T, E>) -> Option<Dispatch> {
        let mut dispatch = None;
        loop {
            let next = self.pending.borrow_ref_mut(cs).events.pop_front();
            let concluded = match next {
                Some(Deferred::Event(notification)) => inner.handle(notification),
                Some(Deferred::Data(len)) => self.replay(cs, inner, len),
                None if self.pending.borrow_ref_mut(cs).reset_overflow() => {
                    if inner.debug {
                        warn!("notification queue overflowed");
                    }
                    inner.failed(Error::OutOfMemory)
                }
                None => break,
            };
            dispatch = dispatch.or(concluded);
        }
        dispatch
    }

    fn replay(
        &self,
        cs: CriticalSection<'_>,
        inner: &mut Inner<T, E>,
        mut len: usize,
    ) -> Option<Dispatch> {
        let mut dispatch = None;
        let mut chunk = [0u8; REPLAY_CHUNK];
        while len > 0 {
            let taken = {
                let mut pending = self.pending.borrow_ref_mut(cs);
                let taken = len.min(REPLAY_CHUNK).min(pending.data.available());
                chunk[..taken].copy_from_slice(&pending.data.peek()[..taken]);
                pending.data.consume(taken);
                taken
            };
            if taken == 0 {
                break;
            }
            len -= taken;
            dispatch = dispatch.or(inner.received(&chunk[..taken]));
        }
        dispatch
    }

    fn start(
        &self,
        exchange: Exchange,
        build: impl FnOnce(&mut Inner<T, E>) -> Result<(), ResultCode>,
    ) -> Result<(), ResultCode> {
        self.lock(|inner| {
            inner.session.begin(exchange)?;
            let result = build(inner).and_then(|()| inner.connect());
            if let Err(code) = result {
                if inner.debug {
                    warn!("exchange refused: {}", code.code());
                }
                inner.session.park(code);
            }
            result
        })
    }

    /// Run `f` with the transport.
    pub fn with_transport<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.lock(|inner| f(&mut inner.transport))
    }

    /// Change the exchange timeout, on the client and on the transport.
    pub fn set_timeout(&self, milliseconds: u32) {
        self.lock(|inner| {
            inner.options.timeout_ms = milliseconds;
            inner.transport.set_rx_timeout(milliseconds);
            inner.transport.set_ack_timeout(milliseconds);
        })
    }

    /// Turn trace output on or off.
    pub fn set_debug(&self, enabled: bool) {
        self.lock(|inner| inner.debug = enabled)
    }

    /// Whether trace output is on.
    pub fn debug(&self) -> bool {
        self.lock(|inner| inner.debug)
    }

    /// Current connection options, including the active timeout.
    pub fn options(&self) -> Options {
        self.lock(|inner| inner.options)
    }

    /// Where the current exchange stands. [`State::Idle`] between exchanges.
    pub fn state(&self) -> State {
        self.lock(|inner| inner.session.state())
    }

    /// Whether a new exchange can be issued.
    pub fn is_idle(&self) -> bool {
        self.lock(|inner| inner.session.is_idle())
    }

    /// Code of the most recently finished exchange.
    pub fn last_code(&self) -> ResultCode {
        self.lock(|inner| inner.session.last_code())
    }

    /// Register the callback for write results, replacing any previous one.
    ///
    /// Refused with [`ResultCode::ConnectFailed`] while an exchange is in flight.
    pub fn on_write_response(&self, callback: WriteCallback) -> Result<(), ResultCode> {
        self.lock(|inner| {
            if !inner.session.is_idle() {
                return Err(ResultCode::ConnectFailed);
            }
            inner.write_callback = Some(callback);
            Ok(())
        })
    }

    /// Register the callback for read results, replacing any previous one.
    ///
    /// Refused with [`ResultCode::ConnectFailed`] while an exchange is in flight.
    pub fn on_read_response(&self, callback: ReadCallback) -> Result<(), ResultCode> {
        self.lock(|inner| {
            if !inner.session.is_idle() {
                return Err(ResultCode::ConnectFailed);
            }
            inner.read_callback = Some(callback);
            Ok(())
        })
    }

    // Writes

    /// Post a caller-built form body (`field1=..&field2=..`).
    pub fn write_raw(&self, form: &str, api_key: Option<&str>) -> Result<(), ResultCode> {
        self.start(Exchange::Write, |inner| {
            inner.queue_update(&RawForm(form), api_key)
        })
    }

    /// Post a single field value. Staged values are not touched.
    pub fn write_field<V: FieldValue>(
        &self,
        field: u8,
        value: V,
        api_key: Option<&str>,
    ) -> Result<(), ResultCode> {
        self.start(Exchange::Write, |inner| {
            let mut single = FieldBatch::new();
            single.set_field(field, value)?;
            inner.queue_update(&single.form(), api_key)
        })
    }

    /// Post every staged value and clear the staged values.
    ///
    /// With nothing staged the write fails with
    /// [`ResultCode::MissingFields`] and nothing is sent.
    pub fn write_fields(&self, api_key: Option<&str>) -> Result<(), ResultCode> {
        self.start(Exchange::Write, |inner| {
            let batch = inner.batch.take();
            let form = batch.form();
            if form.is_empty() {
                return Err(ResultCode::MissingFields);
            }
            inner.queue_update(&form, api_key)
        })
    }

    // Reads

    /// GET `/channels/<channel><suffix>` and report the body as text.
    pub fn read_raw(
        &self,
        channel: u32,
        suffix: &str,
        api_key: Option<&str>,
    ) -> Result<(), ResultCode> {
        self.start(Exchange::Read(Extraction::Raw), |inner| {
            inner.queue_read(channel, suffix, api_key)
        })
    }

    /// Latest value of `field`, as text.
    pub fn read_string_field(
        &self,
        channel: u32,
        field: u8,
        api_key: Option<&str>,
    ) -> Result<(), ResultCode> {
        self.read_field(channel, field, api_key, Extraction::Raw)
    }

    /// Latest value of `field`, as a float. Text reads as 0.
    pub fn read_float_field(
        &self,
        channel: u32,
        field: u8,
        api_key: Option<&str>,
    ) -> Result<(), ResultCode> {
        self.read_field(channel, field, api_key, Extraction::Float)
    }

    /// Latest value of `field`, as an `i32`.
    ///
    /// Values outside the `i32` range saturate.
    pub fn read_int_field(
        &self,
        channel: u32,
        field: u8,
        api_key: Option<&str>,
    ) -> Result<(), ResultCode> {
        self.read_field(channel, field, api_key, Extraction::Int)
    }

    /// Latest value of `field`, as an `i64`.
    pub fn read_long_field(
        &self,
        channel: u32,
        field: u8,
        api_key: Option<&str>,
    ) -> Result<(), ResultCode> {
        self.read_field(channel, field, api_key, Extraction::Long)
    }

    fn read_field(
        &self,
        channel: u32,
        field: u8,
        api_key: Option<&str>,
        extraction: Extraction,
    ) -> Result<(), ResultCode> {
        self.start(Exchange::Read(extraction), |inner| {
            if !(FIELD_NUM_MIN..=FIELD_NUM_MAX).contains(&field) {
                return Err(ResultCode::InvalidFieldNumber);
            }
            let mut suffix: String<16> = String::new();
            write!(suffix, "/fields/{}/last", field).map_err(|_| ResultCode::UnexpectedFail)?;
            inner.queue_read(channel, &suffix, api_key)
        })
    }

    /// Read the latest entry with status and location.
    ///
    /// On success the entry replaces the last feed snapshot, see
    /// [`last_feed`](Self::last_feed).
    pub fn read_multiple_fields(&self, channel: u32, api_key: Option<&str>) -> Result<(), ResultCode> {
        self.start(Exchange::Read(Extraction::Feed), |inner| {
            inner.queue_read(channel, FEED_DETAIL_SUFFIX, api_key)
        })
    }

    /// Timestamp of the latest entry.
    pub fn read_created_at(&self, channel: u32, api_key: Option<&str>) -> Result<(), ResultCode> {
        self.start(Exchange::Read(Extraction::CreatedAt), |inner| {
            inner.queue_read(channel, FEED_SUFFIX, api_key)
        })
    }

    /// Status message of the latest entry.
    pub fn read_status(&self, channel: u32, api_key: Option<&str>) -> Result<(), ResultCode> {
        self.start(Exchange::Read(Extraction::Status), |inner| {
            inner.queue_read(channel, FEED_DETAIL_SUFFIX, api_key)
        })
    }

    // Staged values for `write_fields`. These work while an exchange is in flight.

    /// Stage a value for `field` (1 to 8).
    ///
    /// Fails with [`ResultCode::InvalidFieldNumber`] for other field numbers
    /// and [`ResultCode::OutOfRange`] for values that cannot be encoded.
    pub fn set_field<V: FieldValue>(&self, field: u8, value: V) -> Result<(), ResultCode> {
        self.lock(|inner| inner.batch.set_field(field, value))
    }

    /// Stage the entry latitude in degrees. NaN clears it.
    pub fn set_latitude(&self, latitude: f32) {
        self.lock(|inner| inner.batch.set_latitude(latitude))
    }

    /// Stage the entry longitude in degrees. NaN clears it.
    pub fn set_longitude(&self, longitude: f32) {
        self.lock(|inner| inner.batch.set_longitude(longitude))
    }

    /// Stage the entry elevation in meters. NaN clears it.
    pub fn set_elevation(&self, elevation: f32) {
        self.lock(|inner| inner.batch.set_elevation(elevation))
    }

    /// Stage the entry status message.
    pub fn set_status(&self, status: &str) -> Result<(), ResultCode> {
        self.lock(|inner| inner.batch.set_status(status))
    }

    /// Stage a tweet for the linked Twitter account.
    ///
    /// Both values are checked before either is stored.
    pub fn set_twitter_tweet(&self, twitter: &str, tweet: &str) -> Result<(), ResultCode> {
        self.lock(|inner| inner.batch.set_twitter_tweet(twitter, tweet))
    }

    /// Stage an explicit creation timestamp (ISO 8601) for the entry.
    pub fn set_created_at(&self, created_at: &str) -> Result<(), ResultCode> {
        self.lock(|inner| inner.batch.set_created_at(created_at))
    }

    /// Copy of the staged values.
    pub fn staged(&self) -> FieldBatch {
        self.lock(|inner| inner.batch.clone())
    }

    // Last feed entry

    /// Copy of the entry stored by the last successful
    /// [`read_multiple_fields`](Self::read_multiple_fields).
    pub fn last_feed(&self) -> FeedSnapshot {
        self.lock(|inner| inner.feed.clone())
    }

    /// `field` of the last feed entry, as text.
    ///
    /// Empty for an invalid field number.
    pub fn field_as_string(&self, field: u8) -> FieldText {
        self.lock(|inner| inner.feed.field(field).map(bounded).unwrap_or_default())
    }

    /// `field` of the last feed entry, parsed as a float. 0 when absent.
    pub fn field_as_float(&self, field: u8) -> f32 {
        self.lock(|inner| inner.feed.field_as_float(field))
    }

    /// `field` of the last feed entry, parsed as an `i64`. 0 when absent.
    pub fn field_as_long(&self, field: u8) -> i64 {
        self.lock(|inner| inner.feed.field_as_long(field))
    }

    /// `field` of the last feed entry, parsed as an `i32`.
    pub fn field_as_int(&self, field: u8) -> i32 {
        self.lock(|inner| inner.feed.field_as_int(field))
    }

    /// Status message of the last feed entry.
    pub fn status(&self) -> FieldText {
        self.lock(|inner| inner.feed.status.clone())
    }

    /// Latitude of the last feed entry. 0 when absent.
    pub fn latitude(&self) -> f32 {
        self.lock(|inner| inner.feed.latitude())
    }

    /// Longitude of the last feed entry. 0 when absent.
    pub fn longitude(&self) -> f32 {
        self.lock(|inner| inner.feed.longitude())
    }

    /// Elevation of the last feed entry. 0 when absent.
    pub fn elevation(&self) -> f32 {
        self.lock(|inner| inner.feed.elevation())
    }

    /// Creation timestamp of the last feed entry.
    pub fn created_at(&self) -> FieldText {
        self.lock(|inner| inner.feed.created_at.clone())
    }

    // Transport notifications

    /// The connection requested by an exchange is open.
    pub fn on_connect(&self) {
        self.notify(Notification::Connect)
    }

    /// The connection is gone.
    pub fn on_disconnect(&self) {
        self.notify(Notification::Disconnect)
    }

    /// The transport failed.
    pub fn on_error(&self, error: Error) {
        self.notify(Notification::Error(error))
    }

    /// Inbound bytes, in arrival order, split anywhere.
    pub fn on_data(&self, data: &[u8]) {
        self.notify(Notification::Data(data))
    }

    /// `len` outbound bytes were acknowledged after `elapsed_ms`.
    pub fn on_ack(&self, len: usize, elapsed_ms: u32) {
        self.notify(Notification::Ack(len, elapsed_ms))
    }

    /// Drive timeouts and report outcomes decided by an issuing call.
    ///
    /// Call periodically with a millisecond clock; wrap-around is fine.
    pub fn poll(&self, now_ms: u32) {
        self.notify(Notification::Poll(now_ms))
    }
}

impl<T: Transport, E: ValueExtractor> fmt::Debug for Client<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

fn headers<'a>(options: &'a Options, api_key: Option<&'a str>, form: bool) -> Vec<Header<'a>, 4> {
    let mut headers = Vec::new();
    let mut add = |name: &'a str, value: &'a str| {
        // Four slots for at most four headers.
        let _ = headers.push(Header { name, value });
    };
    add("Host", options.host);
    add("User-Agent", options.user_agent);
    if let Some(key) = api_key {
        add(API_KEY_HEADER, key);
    }
    if form {
        add("Content-Type", FORM_CONTENT_TYPE);
    }
    headers
}

impl<T: Transport, E: ValueExtractor> Inner<T, E> {
    fn handle(&mut self, notification: Notification<'_>) -> Option<Dispatch> {
        match notification {
            Notification::Connect => self.connected(),
            Notification::Disconnect => self.disconnected(),
            Notification::Error(error) => self.failed(error),
            Notification::Data(data) => self.received(data),
            Notification::Ack(len, elapsed_ms) => self.acknowledged(len, elapsed_ms),
            Notification::Poll(now_ms) => self.poll(now_ms),
        }
    }

    fn queue_update(&mut self, body: &dyn Body, api_key: Option<&str>) -> Result<(), ResultCode> {
        let options = self.options;
        let headers = headers(&options, api_key, true);
        let request = Request {
            method: Method::Post,
            target: &"/update",
            headers: &headers,
            body: Some(body),
        };
        self.queue(&request)
    }

    fn queue_read(
        &mut self,
        channel: u32,
        suffix: &str,
        api_key: Option<&str>,
    ) -> Result<(), ResultCode> {
        let options = self.options;
        let headers = headers(&options, api_key, false);
        let target = ChannelPath { channel, suffix };
        let request = Request {
            method: Method::Get,
            target: &target,
            headers: &headers,
            body: None,
        };
        self.queue(&request)
    }

    fn queue(&mut self, request: &Request<'_>) -> Result<(), ResultCode> {
        request
            .write_to(&mut self.session.request)
            .map_err(|_| ResultCode::UnexpectedFail)?;
        if self.debug {
            debug!("queued {} request bytes", self.session.request.available());
        }
        Ok(())
    }

    fn connect(&mut self) -> Result<(), ResultCode> {
        if self.transport.is_connected() {
            return self.enter_connected();
        }
        let Options { host, port, .. } = self.options;
        if self.debug {
            debug!("connecting to {}:{}", host, port);
        }
        self.transport
            .connect(host, port)
            .map_err(|_| ResultCode::ConnectFailed)
    }

    fn enter_connected(&mut self) -> Result<(), ResultCode> {
        self.session.set_state(State::Connected);
        self.flush()
    }

    /// Hand the transport as much of the request as its window takes.
    fn flush(&mut self) -> Result<(), ResultCode> {
        let request = &mut self.session.request;
        if request.is_empty() || !self.transport.can_send() {
            return Ok(());
        }
        let window = self.transport.send_window().min(request.available());
        if window == 0 {
            return Ok(());
        }
        let accepted = self.transport.enqueue(&request.peek()[..window]);
        request.consume(accepted);
        if accepted == 0 {
            return Ok(());
        }
        if self.debug {
            debug!("sent {} bytes, {} pending", accepted, request.available());
        }
        self.transport.send().map_err(|_| ResultCode::UnexpectedFail)
    }

    fn close(&mut self) {
        self.transport.close();
        if self.transport.is_connected() {
            self.session.set_state(State::Closing);
        } else {
            self.session.release();
        }
    }

    /// Finish the exchange with `code` and prepare its callback.
    fn conclude(&mut self, code: ResultCode, value: Option<ReadValue>) -> Dispatch {
        self.session.conclude(code);
        if self.debug {
            debug!("exchange finished: {}", code.code());
        }
        match self.session.exchange() {
            Exchange::Write => Dispatch::Write {
                callback: self.write_callback,
                code,
            },
            Exchange::Read(extraction) => Dispatch::Read {
                callback: self.read_callback,
                code,
                value: value.unwrap_or_else(|| ReadValue::empty(extraction, &self.feed)),
            },
        }
    }

    fn abort(&mut self, code: ResultCode) -> Dispatch {
        let dispatch = self.conclude(code, None);
        self.close();
        dispatch
    }

    /// Code for an exchange cut off after the connection opened.
    fn interrupted(&self) -> ResultCode {
        if self.session.response.received() > 0 {
            ResultCode::BadResponse
        } else {
            ResultCode::UnexpectedFail
        }
    }

    fn complete(&mut self) -> Dispatch {
        let status = self.session.response.status().unwrap_or_default();
        let exchange = self.session.exchange();
        let body = self.session.response.take_body();
        let (code, value) = match core::str::from_utf8(body) {
            Ok(body) => evaluate(
                &self.extractor,
                &mut self.feed,
                exchange,
                ResultCode::from_status(status),
                body,
            ),
            Err(_) => (ResultCode::BadResponse, None),
        };
        let dispatch = self.conclude(code, value);
        self.close();
        dispatch
    }

    fn connected(&mut self) -> Option<Dispatch> {
        self.session.touch();
        if self.session.state() != State::Connecting {
            return None;
        }
        self.enter_connected().err().map(|code| self.abort(code))
    }

    fn acknowledged(&mut self, len: usize, elapsed_ms: u32) -> Option<Dispatch> {
        self.session.touch();
        if !self.session.state().is_active() {
            return None;
        }
        if self.debug {
            debug!("{} bytes acknowledged after {} ms", len, elapsed_ms);
        }
        self.flush().err().map(|code| self.abort(code))
    }

    fn received(&mut self, data: &[u8]) -> Option<Dispatch> {
        self.session.touch();
        if !self.session.state().is_active() {
            if self.debug {
                warn!("dropped {} bytes outside an exchange", data.len());
            }
            return None;
        }
        match self.session.response.push(data) {
            Ok(Progress::Head) => None,
            Ok(Progress::Body) => {
                let state = if self.session.response.buffered_body() > 0 {
                    State::BodyInProgress
                } else {
                    State::HeadersReceived
                };
                self.session.set_state(state);
                None
            }
            Ok(Progress::Complete) => Some(self.complete()),
            Err(_) => Some(self.abort(ResultCode::BadResponse)),
        }
    }

    fn disconnected(&mut self) -> Option<Dispatch> {
        self.session.touch();
        let code = match self.session.state() {
            State::Idle | State::Complete => return None,
            State::Closing => {
                self.session.release();
                return None;
            }
            State::Connecting => ResultCode::ConnectFailed,
            _ => self.interrupted(),
        };
        let dispatch = self.conclude(code, None);
        self.session.release();
        Some(dispatch)
    }

    fn failed(&mut self, error: Error) -> Option<Dispatch> {
        self.session.touch();
        if self.debug {
            warn!("transport error: {}", error);
        }
        match self.session.state() {
            State::Idle | State::Complete => None,
            State::Closing => {
                self.session.release();
                None
            }
            State::Connecting => {
                let dispatch = self.conclude(ResultCode::ConnectFailed, None);
                self.session.release();
                Some(dispatch)
            }
            _ => {
                let code = match error {
                    Error::Timeout => ResultCode::Timeout,
                    _ => self.interrupted(),
                };
                Some(self.abort(code))
            }
        }
    }

    fn poll(&mut self, now_ms: u32) -> Option<Dispatch> {
        let timeout_ms = self.options.timeout_ms;
        match self.session.state() {
            State::Idle => None,
            State::Complete => {
                let code = self
                    .session
                    .take_outcome()
                    .unwrap_or(self.session.last_code());
                let dispatch = self.conclude(code, None);
                if self.transport.is_connected() {
                    self.close();
                } else {
                    self.session.release();
                }
                Some(dispatch)
            }
            State::Closing => {
                if !self.transport.is_connected() || self.session.timed_out(now_ms, timeout_ms) {
                    self.session.release();
                }
                None
            }
            _ => {
                if self.session.timed_out(now_ms, timeout_ms) {
                    Some(self.abort(ResultCode::Timeout))
                } else {
                    None
                }
            }
        }
    }
}

/// Outcome and value of a fully received response.
fn evaluate<E: ValueExtractor>(
    extractor: &E,
    feed: &mut FeedSnapshot,
    exchange: Exchange,
    code: ResultCode,
    body: &str,
) -> (ResultCode, Option<ReadValue>) {
    let extraction = match exchange {
        // The update endpoint answers with the new entry id, 0 when nothing was stored.
        Exchange::Write if code.is_success() && parse_long(body) == 0 => {
            return (ResultCode::NotInserted, None);
        }
        Exchange::Write => return (code, None),
        Exchange::Read(_) if !code.is_success() => return (code, None),
        Exchange::Read(extraction) => extraction,
    };

    let value = match extraction {
        Extraction::Raw => ReadValue::Text(text(body)),
        Extraction::Float => ReadValue::Float(parse_float(body)),
        Extraction::Int => ReadValue::Int(clamp_i32(parse_long(body))),
        Extraction::Long => ReadValue::Long(parse_long(body)),
        Extraction::CreatedAt => ReadValue::Text(text(extractor.extract(body, "created_at"))),
        Extraction::Status => ReadValue::Text(text(extractor.extract(body, "status"))),
        Extraction::Feed => {
            *feed = extractor.extract_feed(body);
            ReadValue::Feed(feed.clone())
        }
    };
    (code, Some(value))
}

fn text(value: &str) -> String<RESPONSE_CAPACITY> {
    // Bodies never exceed the response buffer.
    String::try_from(value).unwrap_or_default()
}
