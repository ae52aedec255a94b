//! Terminal driver for the TUI.
//!
//! Implements the [`Driver`] trait for terminal I/O using crossterm for
//! keyboard events and ratatui for rendering. Termination signals are
//! surfaced as [`AppEvent::Interrupt`].

use std::{
    io::{self, Stdout, stdout},
    time::Duration,
};

use auditview_app::{App, AppEvent, Driver, KeyInput};
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use thiserror::Error;
use tokio::signal::unix::{Signal, SignalKind, signal};

use crate::ui;

/// Interval between ticks when no input arrives.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Terminal driver errors.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// I/O error from terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The terminal stopped delivering input events.
    #[error("terminal input closed")]
    InputClosed,
}

/// Terminal driver implementing the [`Driver`] trait.
///
/// Puts the terminal in raw mode on the alternate screen for its lifetime
/// and restores it on [`Driver::stop`] or drop, whichever comes first.
pub struct TerminalDriver {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_stream: EventStream,
    sigint: Signal,
    sigterm: Signal,
    restored: bool,
}

impl TerminalDriver {
    /// Take over the terminal.
    pub fn new() -> Result<Self, TerminalError> {
        // Signal handlers first: nothing to undo if they fail
        let sigint = signal(SignalKind::interrupt())?;
        let sigterm = signal(SignalKind::terminate())?;

        enable_raw_mode()?;
        let terminal = undo_on_error(enter_alternate_screen, || {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = disable_raw_mode();
        })?;
        let event_stream = EventStream::new();

        Ok(Self { terminal, event_stream, sigint, sigterm, restored: false })
    }

    /// Convert a crossterm key press to `KeyInput`.
    fn convert_key(key: KeyEvent) -> Option<KeyInput> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(KeyInput::CtrlC)
            },
            KeyCode::Char(c) => Some(KeyInput::Char(c)),
            KeyCode::Esc => Some(KeyInput::Esc),
            _ => None,
        }
    }

    /// Convert a terminal event, dropping the ones the App has no use for.
    fn convert_event(event: Event) -> Option<AppEvent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Self::convert_key(key).map(AppEvent::Key)
            },
            Event::Resize(cols, rows) => Some(AppEvent::Resize(cols, rows)),
            _ => None,
        }
    }
}

fn enter_alternate_screen() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    stdout().execute(EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout()))
}

/// Run `setup`, calling `undo` if it fails.
///
/// Covers the window where raw mode is on but no driver exists yet whose
/// `Drop` would restore the terminal.
fn undo_on_error<T>(setup: impl FnOnce() -> io::Result<T>, undo: impl FnOnce()) -> io::Result<T> {
    setup().inspect_err(|_| undo())
}

impl Driver for TerminalDriver {
    type Error = TerminalError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        tokio::select! {
            biased;

            _ = self.sigterm.recv() => Ok(Some(AppEvent::Interrupt)),
            _ = self.sigint.recv() => Ok(Some(AppEvent::Interrupt)),

            // Terminal events
            maybe_event = self.event_stream.next() => match maybe_event {
                Some(Ok(event)) => Ok(Self::convert_event(event)),
                Some(Err(e)) => Err(TerminalError::Io(e)),
                None => Err(TerminalError::InputClosed),
            },

            // Tick timeout
            () = tokio::time::sleep(TICK_INTERVAL) => Ok(Some(AppEvent::Tick)),
        }
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| {
            ui::render(frame, app);
        })?;
        Ok(())
    }

    fn stop(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

impl Drop for TerminalDriver {
    fn drop(&mut self) {
        self.stop();
    }
}
