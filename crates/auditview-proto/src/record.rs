//! Audit record and its text grammar.
//!
//! A record is three text fields. Decoding is a pure, total function: input
//! that does not split into three fields is wrapped in a synthesized record
//! instead of being rejected, so a producer can never make the display drop
//! an event.

use std::fmt;

/// Separator between the fields of a wire message.
pub const FIELD_DELIMITER: char = '|';

/// Event type assigned to messages that do not match the grammar.
pub const UNKNOWN_EVENT_TYPE: &str = "UNKNOWN";

/// User assigned to messages that do not match the grammar.
pub const UNKNOWN_USER: &str = "SYSTEM";

/// Number of fields in a well-formed message.
const FIELD_COUNT: usize = 3;

/// A decoded audit event.
///
/// # Invariants
///
/// - Always exactly three fields. Malformed input is represented as
///   `UNKNOWN` / `SYSTEM` / raw message rather than as an error.
/// - Immutable once constructed. Fields are only reachable through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AuditRecord {
    event_type: String,
    user: String,
    detail: String,
}

impl AuditRecord {
    /// Create a record from its three fields.
    pub fn new(
        event_type: impl Into<String>,
        user: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self { event_type: event_type.into(), user: user.into(), detail: detail.into() }
    }

    /// Record synthesized for a message that does not match the grammar.
    pub fn unknown(raw: impl Into<String>) -> Self {
        Self::new(UNKNOWN_EVENT_TYPE, UNKNOWN_USER, raw)
    }

    /// Short category tag (e.g. `LOGIN`, `SUDO`).
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// Principal the event is about.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Free-form description.
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Fields in display order.
    pub fn fields(&self) -> [&str; FIELD_COUNT] {
        [&self.event_type, &self.user, &self.detail]
    }

    /// Encode into the wire form `<event_type>|<user>|<detail>`.
    ///
    /// No escaping is applied. A delimiter inside `event_type` or `user`
    /// shifts the field boundaries on decode; one inside `detail` survives.
    pub fn encode(&self) -> String {
        format!(
            "{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{}",
            self.event_type, self.user, self.detail
        )
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.event_type, self.user, self.detail)
    }
}

/// Decode one message into an [`AuditRecord`].
///
/// The split is capped at three segments, so the detail keeps any further
/// delimiters verbatim. Input with fewer than three segments becomes
/// [`AuditRecord::unknown`] carrying the whole message.
pub fn decode(raw: &str) -> AuditRecord {
    let mut parts = raw.splitn(FIELD_COUNT, FIELD_DELIMITER);

    match (parts.next(), parts.next(), parts.next()) {
        (Some(event_type), Some(user), Some(detail)) => {
            AuditRecord::new(event_type, user, detail)
        },
        _ => AuditRecord::unknown(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_well_formed_message() {
        let record = decode("LOGIN|alice|via ssh");

        assert_eq!(record.event_type(), "LOGIN");
        assert_eq!(record.user(), "alice");
        assert_eq!(record.detail(), "via ssh");
    }

    #[test]
    fn message_without_delimiter_is_unknown() {
        let record = decode("malformed");

        assert_eq!(record, AuditRecord::new("UNKNOWN", "SYSTEM", "malformed"));
    }

    #[test]
    fn two_segments_keep_the_raw_message() {
        let record = decode("LOGIN|alice");

        assert_eq!(record, AuditRecord::unknown("LOGIN|alice"));
    }

    #[test]
    fn detail_keeps_extra_delimiters() {
        let record = decode("SUDO|bob|cmd=/bin/sh -c 'a|b'|tty=pts/1");

        assert_eq!(record.event_type(), "SUDO");
        assert_eq!(record.user(), "bob");
        assert_eq!(record.detail(), "cmd=/bin/sh -c 'a|b'|tty=pts/1");
    }

    #[test]
    fn empty_fields_are_preserved() {
        let record = decode("||");

        assert_eq!(record.fields(), ["", "", ""]);
    }

    #[test]
    fn empty_message_is_unknown() {
        assert_eq!(decode(""), AuditRecord::unknown(""));
    }

    #[test]
    fn encode_matches_wire_grammar() {
        let record = AuditRecord::new("INFO", "u", "E7");

        assert_eq!(record.encode(), "INFO|u|E7");
        assert_eq!(decode(&record.encode()), record);
    }

    #[test]
    fn display_is_human_readable() {
        let record = AuditRecord::new("LOGIN", "alice", "via ssh");

        assert_eq!(record.to_string(), "[LOGIN] alice: via ssh");
    }
}
