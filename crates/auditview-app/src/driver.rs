//! Driver trait for abstracting I/O operations.
//!
//! The [`Driver`] trait decouples the render loop from a specific terminal
//! library. The production frontend implements it with crossterm and ratatui;
//! tests implement it with scripted input and recorded frames. The generic
//! [`crate::Runtime`] handles all orchestration.

use std::future::Future;

use crate::{App, AppEvent};

/// Abstracts user input and rendering for the render loop.
///
/// Implementations are only ever called from the task that owns the
/// [`App`], so they never observe concurrent mutation of the row set.
///
/// # Implementations
///
/// - **TUI**: crossterm for terminal events and signals, ratatui for drawing
/// - **Tests**: scripted events, rendered rows captured for assertions
pub trait Driver: Send {
    /// Platform-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Wait for the next user-interface event.
    ///
    /// Returns `None` when the wait ended without an event worth handling
    /// (for instance an unmapped key). Must be cancel-safe: the runtime
    /// drops the future whenever an audit record arrives first.
    ///
    /// # Errors
    ///
    /// Returns an error if the input source failed.
    fn poll_event(&mut self) -> impl Future<Output = Result<Option<AppEvent>, Self::Error>> + Send;

    /// Draw the application state.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails. The runtime treats this as
    /// fatal.
    fn render(&mut self, app: &App) -> Result<(), Self::Error>;

    /// Release resources and restore the terminal.
    fn stop(&mut self);
}
