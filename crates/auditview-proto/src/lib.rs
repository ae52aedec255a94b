//! Wire format for auditview.
//!
//! Audit events travel as UTF-8 text, one event per message, with fields
//! joined by `|`:
//!
//! ```text
//! <event_type>|<user>|<free-form detail>
//! ```
//!
//! Stream transports delimit messages with `\n` (see [`LineFramer`]);
//! datagram transports send one message per datagram. Decoding is total:
//! every message yields an [`AuditRecord`], malformed ones included.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod framing;
mod record;

pub use framing::{
    DEFAULT_MAX_MESSAGE_LEN, FramingError, LineFramer, MAX_TERMINATOR_LEN, datagram_message,
    strip_terminator,
};
pub use record::{AuditRecord, FIELD_DELIMITER, UNKNOWN_EVENT_TYPE, UNKNOWN_USER, decode};
