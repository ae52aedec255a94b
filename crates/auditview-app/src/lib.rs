//! Application layer for auditview
//!
//! Pure display state machine and a generic render loop. The loop is the
//! single consumer of decoded audit records: it owns the [`App`] (and through
//! it the bounded [`History`]) and is the only place that mutates it, so no
//! locking is needed downstream of the inbound channel.
//!
//! # Components
//!
//! - [`App`]: display state machine (`Running` / `Terminating`)
//! - [`History`]: bounded FIFO window of the most recent records
//! - [`Driver`]: trait for platform-specific input and rendering
//! - [`Runtime`]: render loop multiplexing records and user input

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod driver;
mod event;
mod history;
mod input;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use auditview_proto::AuditRecord;
pub use driver::Driver;
pub use event::AppEvent;
pub use history::{History, MAX_ROWS};
pub use input::KeyInput;
pub use runtime::Runtime;
pub use state::AppState;
