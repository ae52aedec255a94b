//! Newline framing for stream transports.
//!
//! Stream sockets carry a byte stream, so message boundaries are recovered
//! by scanning for `\n`. [`LineFramer`] buffers partial input across reads and
//! enforces a maximum message length so a producer that never sends a
//! newline cannot grow the buffer without bound.

use bytes::{Buf, BytesMut};
use thiserror::Error;

/// Default upper bound on a single message, in bytes.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 64 * 1024;

/// Longest terminator removed from a message (`\r\n`).
pub const MAX_TERMINATOR_LEN: usize = 2;

const LINE_FEED: u8 = b'\n';
const CARRIAGE_RETURN: u8 = b'\r';

/// Errors produced while splitting a byte stream into messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FramingError {
    /// A message grew past the configured limit.
    ///
    /// Fatal for the stream: the remainder cannot be resynchronized.
    #[error("message exceeds {limit} bytes")]
    MessageTooLong {
        /// Configured maximum message length.
        limit: usize,
    },
}

/// Incremental splitter of a byte stream into text messages.
///
/// Bytes are appended with [`LineFramer::extend`] and complete messages are
/// drained with [`LineFramer::next_message`]. Empty lines are skipped and a
/// trailing `\r` is removed. Invalid UTF-8 is replaced rather than rejected.
///
/// The length limit applies to the message itself; the `\n` or `\r\n`
/// terminator does not count against it.
#[derive(Debug)]
pub struct LineFramer {
    buffer: BytesMut,
    /// Prefix of `buffer` already known to contain no line feed.
    scanned: usize,
    max_len: usize,
}

impl LineFramer {
    /// Create a framer that rejects messages longer than `max_len` bytes.
    pub fn new(max_len: usize) -> Self {
        Self { buffer: BytesMut::new(), scanned: 0, max_len }
    }

    /// Append bytes read from the stream.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Number of bytes buffered but not yet returned as a message.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Next complete message, or `None` if more input is needed.
    pub fn next_message(&mut self) -> Result<Option<String>, FramingError> {
        loop {
            let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == LINE_FEED)
            else {
                self.scanned = self.buffer.len();
                if trim_carriage_return(&self.buffer).len() > self.max_len {
                    return Err(FramingError::MessageTooLong { limit: self.max_len });
                }
                return Ok(None);
            };

            let line_len = self.scanned + offset;
            self.scanned = 0;
            if trim_carriage_return(&self.buffer[..line_len]).len() > self.max_len {
                return Err(FramingError::MessageTooLong { limit: self.max_len });
            }

            let line = self.buffer.split_to(line_len);
            self.buffer.advance(1);

            let message = strip_terminator(&line);
            if !message.is_empty() {
                return Ok(Some(message));
            }
        }
    }

    /// Drain the unterminated tail once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        self.scanned = 0;
        let tail = self.buffer.split();
        let message = strip_terminator(&tail);
        (!message.is_empty()).then_some(message)
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGE_LEN)
    }
}

/// Convert one raw message to text, dropping a trailing `\n` or `\r\n`.
///
/// Used for both framed lines and whole datagrams; producers commonly
/// terminate datagrams with a newline out of habit.
pub fn strip_terminator(raw: &[u8]) -> String {
    String::from_utf8_lossy(trim_terminator(raw)).into_owned()
}

/// Convert one whole datagram to text under the same limit as [`LineFramer`].
///
/// The kernel silently truncates datagrams larger than the receive buffer,
/// so callers size it past `max_len + MAX_TERMINATOR_LEN` and let this
/// reject what does not fit.
pub fn datagram_message(raw: &[u8], max_len: usize) -> Result<String, FramingError> {
    let message = trim_terminator(raw);
    if message.len() > max_len {
        return Err(FramingError::MessageTooLong { limit: max_len });
    }
    Ok(String::from_utf8_lossy(message).into_owned())
}

fn trim_terminator(raw: &[u8]) -> &[u8] {
    trim_carriage_return(raw.strip_suffix(&[LINE_FEED]).unwrap_or(raw))
}

fn trim_carriage_return(raw: &[u8]) -> &[u8] {
    raw.strip_suffix(&[CARRIAGE_RETURN]).unwrap_or(raw)
}
