//! Application input events.
//!
//! This module defines [`AppEvent`], the set of inputs that drive the
//! [`crate::App`] state machine.
//!
//! Events originate from two distinct sources:
//! - User interactions (keyboard, resize, process signals) and ticks.
//! - Audit records arriving from the listener through the event bridge.

use auditview_proto::AuditRecord;

use crate::KeyInput;

/// Events processed by the App state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Keyboard input.
    Key(KeyInput),

    /// Periodic tick.
    Tick,

    /// Terminal resize (columns, rows).
    Resize(u16, u16),

    /// Interrupt signal delivered to the process (SIGINT / SIGTERM).
    Interrupt,

    /// Decoded audit record from the event bridge.
    Record(AuditRecord),
}
