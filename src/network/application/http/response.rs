use crate::network::buffer::{ByteQueue, CRLF};

const STATUS_PREFIX: &[u8] = b"HTTP/1.";
const CONTENT_LENGTH: &[u8] = b"Content-Length:";

/// Why an inbound response was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseError {
    /// The response did not fit the receive buffer.
    Overflow,
    /// The first line is not an HTTP/1.x status line.
    NotHttp,
    /// The status code is missing or not a number.
    BadStatus,
    /// The `Content-Length` value is not a number.
    BadContentLength,
    /// The header block ended before a status line was seen.
    MissingStatus,
}

/// How far an exchange's response has progressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Still inside the header block.
    Head,
    /// Headers are in; the body is not complete yet.
    Body,
    /// The declared body is fully buffered.
    Complete,
}

/// Incremental HTTP/1.1 response parser over a fixed-capacity buffer.
#[derive(Debug, Default)]
pub struct ResponseAssembler<const N: usize> {
    buffer: ByteQueue<N>,
    status: Option<u16>,
    content_length: Option<usize>,
    headers_done: bool,
    received: usize,
}

impl<const N: usize> ResponseAssembler<N> {
    pub const fn new() -> Self {
        Self {
            buffer: ByteQueue::new(),
            status: None,
            content_length: None,
            headers_done: false,
            received: 0,
        }
    }

    /// Forget everything about the previous response.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.status = None;
        self.content_length = None;
        self.headers_done = false;
        self.received = 0;
    }

    /// Status code, once the status line has been parsed.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn content_length(&self) -> Option<usize> {
        self.content_length
    }

    pub fn headers_done(&self) -> bool {
        self.headers_done
    }

    /// Total inbound bytes pushed since the last reset.
    pub fn received(&self) -> usize {
        self.received
    }

    /// Body bytes buffered and not yet taken.
    pub fn buffered_body(&self) -> usize {
        if self.headers_done { self.buffer.available() } else { 0 }
    }

    /// Consume one inbound chunk.
    ///
    /// Header lines are parsed as soon as they are complete; a partial line
    /// stays buffered until the next chunk. Once the blank line has been seen
    /// the response is complete when at least `Content-Length` body bytes are
    /// buffered (or immediately, when no length was declared).
    pub fn push(&mut self, chunk: &[u8]) -> Result<Progress, ResponseError> {
        self.buffer
            .append(chunk)
            .map_err(|_| ResponseError::Overflow)?;
        self.received += chunk.len();

        while !self.headers_done {
            let Some(line) = self.buffer.read_line() else {
                break;
            };

            if line == CRLF {
                if self.status.is_none() {
                    return Err(ResponseError::MissingStatus);
                }
                self.headers_done = true;
            } else if line.starts_with(STATUS_PREFIX) {
                self.status = Some(parse_status(line)?);
            } else if self.status.is_none() {
                return Err(ResponseError::NotHttp);
            } else if starts_with_ignore_case(line, CONTENT_LENGTH) {
                self.content_length = Some(parse_content_length(line)?);
            }
        }

        Ok(self.progress())
    }

    pub fn progress(&self) -> Progress {
        if !self.headers_done {
            Progress::Head
        } else if self.buffer.available() >= self.content_length.unwrap_or(0) {
            Progress::Complete
        } else {
            Progress::Body
        }
    }

    /// Take the body of a complete response.
    ///
    /// Exactly `Content-Length` bytes are returned; bytes past the declared
    /// length are left in the buffer. Without a declared length every
    /// buffered byte is the body.
    pub fn take_body(&mut self) -> &[u8] {
        if !self.headers_done {
            return &[];
        }
        match self.content_length {
            Some(len) if len <= self.buffer.available() => {
                self.buffer.read_exact(len).unwrap_or(&[])
            }
            Some(_) => &[],
            None => self.buffer.read_remaining(),
        }
    }
}

/// `HTTP/1.1 200 OK` -> 200: the token after the version, up to the next space.
fn parse_status(line: &[u8]) -> Result<u16, ResponseError> {
    let rest = strip_crlf(line);
    let rest = rest
        .iter()
        .position(|&b| b == b' ')
        .map(|pos| &rest[pos + 1..])
        .ok_or(ResponseError::BadStatus)?;
    let token = rest.split(|&b| b == b' ').next().unwrap_or(&[]);
    parse_decimal(token)
        .and_then(|code| u16::try_from(code).ok())
        .ok_or(ResponseError::BadStatus)
}

/// `Content-Length: 42` -> 42: the token after the colon-space, up to the next space.
fn parse_content_length(line: &[u8]) -> Result<usize, ResponseError> {
    let value = strip_crlf(&line[CONTENT_LENGTH.len()..]);
    let value = value.trim_ascii_start();
    let token = value.split(|&b| b == b' ').next().unwrap_or(&[]);
    parse_decimal(token).ok_or(ResponseError::BadContentLength)
}

fn strip_crlf(line: &[u8]) -> &[u8] {
    line.strip_suffix(CRLF).unwrap_or(line)
}

fn parse_decimal(token: &[u8]) -> Option<usize> {
    if token.is_empty() {
        return None;
    }
    token.iter().try_fold(0usize, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(usize::from(b - b'0'))
    })
}

fn starts_with_ignore_case(line: &[u8], prefix: &[u8]) -> bool {
    line.len() >= prefix.len() && line[..prefix.len()].eq_ignore_ascii_case(prefix)
}
