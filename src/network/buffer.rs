//! Fixed-capacity byte queue
//!
//! A FIFO of bytes backed by a `heapless::Vec`. Bytes are appended at the
//! back and consumed from the front; consumed bytes are never handed out
//! again. Storage is compacted lazily when an append would not fit.

use heapless::Vec;

/// Two-byte line terminator used by HTTP/1.1.
pub const CRLF: &[u8] = b"\r\n";

/// The queue has no room for the appended bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow;

/// A streaming byte buffer with line-oriented and length-bounded reads.
#[derive(Debug, Default)]
pub struct ByteQueue<const N: usize> {
    data: Vec<u8, N>,
    head: usize,
}

impl<const N: usize> ByteQueue<N> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            head: 0,
        }
    }

    /// Number of unread bytes.
    pub fn available(&self) -> usize {
        self.data.len() - self.head
    }

    /// Whether there are no unread bytes.
    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Drop every byte, read or not.
    pub fn clear(&mut self) {
        self.data.clear();
        self.head = 0;
    }

    /// Append bytes at the back.
    ///
    /// Either every byte is appended or, on [`Overflow`], none is.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), Overflow> {
        if bytes.len() > N - self.available() {
            return Err(Overflow);
        }
        if bytes.len() > N - self.data.len() {
            self.compact();
        }
        self.data.extend_from_slice(bytes).map_err(|_| Overflow)
    }

    /// Unread bytes, without consuming them.
    pub fn peek(&self) -> &[u8] {
        &self.data[self.head..]
    }

    /// Mark `n` bytes (at most [`available`](Self::available)) as consumed.
    pub fn consume(&mut self, n: usize) {
        self.head += n.min(self.available());
        if self.head == self.data.len() {
            self.clear();
        }
    }

    /// Read one line, terminator included.
    ///
    /// Returns `None` and consumes nothing when no complete line is buffered.
    pub fn read_line(&mut self) -> Option<&[u8]> {
        let start = self.head;
        let end = find(self.peek(), CRLF)? + CRLF.len();
        self.head += end;
        Some(&self.data[start..start + end])
    }

    /// Read exactly `n` bytes, or nothing if fewer are buffered.
    pub fn read_exact(&mut self, n: usize) -> Option<&[u8]> {
        if n > self.available() {
            return None;
        }
        let start = self.head;
        self.head += n;
        Some(&self.data[start..start + n])
    }

    /// Read every unread byte.
    pub fn read_remaining(&mut self) -> &[u8] {
        let start = self.head;
        self.head = self.data.len();
        &self.data[start..]
    }

    fn compact(&mut self) {
        if self.head == 0 {
            return;
        }
        let len = self.data.len();
        self.data.copy_within(self.head..len, 0);
        self.data.truncate(len - self.head);
        self.head = 0;
    }
}

impl<const N: usize> core::fmt::Write for ByteQueue<N> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        self.append(s.as_bytes()).map_err(|_| core::fmt::Error)
    }
}

/// Finds the first occurrence of a slice in another slice and returns its starting position.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
