//! Terminal UI for auditview
//!
//! A thin shell over [`auditview_app::Driver`] that provides terminal-specific
//! I/O. All orchestration logic lives in the generic [`auditview_app::Runtime`]
//!
//! This crate only handles terminal rendering.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod terminal;
pub mod ui;

pub use auditview_app::{App, AppAction, AppEvent, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
