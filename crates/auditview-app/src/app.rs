//! Display state machine.
//!
//! Pure state machine that processes audit records and user input, producing
//! actions for the runtime to execute. Completely decoupled from I/O.

use std::collections::vec_deque;

use auditview_proto::AuditRecord;

use crate::{AppAction, AppEvent, AppState, History, KeyInput};

/// Display state machine.
///
/// Owns the bounded [`History`] shown as the audit table plus the counters
/// and labels shown in the status bar. Pure and testable: every transition
/// goes through [`App::handle`].
#[derive(Debug, Clone)]
pub struct App {
    /// Lifecycle state.
    state: AppState,
    /// Human-readable description of the event source (endpoint and mode).
    source: String,
    /// Most recent records, oldest first.
    history: History,
    /// Records received since start, including evicted ones.
    total_received: u64,
}

impl App {
    /// Create a running App keeping at most `capacity` rows.
    pub fn new(source: String, capacity: usize) -> Self {
        Self {
            state: AppState::Running,
            source,
            history: History::new(capacity),
            total_received: 0,
        }
    }

    /// Process an event and return actions for the runtime.
    ///
    /// Once terminating, every event is ignored.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        if self.state == AppState::Terminating {
            return vec![];
        }

        match event {
            AppEvent::Record(record) => {
                self.total_received = self.total_received.saturating_add(1);
                if let Some(evicted) = self.history.push(record) {
                    tracing::trace!(%evicted, "evicted oldest row");
                }
                vec![AppAction::Render]
            },
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Interrupt => self.quit(),
            // Layout is recomputed from the frame on every draw
            AppEvent::Resize(..) => vec![AppAction::Render],
            AppEvent::Tick => vec![],
        }
    }

    /// Handle keyboard input.
    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if key.is_quit() { self.quit() } else { vec![] }
    }

    fn quit(&mut self) -> Vec<AppAction> {
        tracing::debug!("quit requested");
        self.state = AppState::Terminating;
        vec![AppAction::Quit]
    }

    /// Enter `Terminating` without a user request (fatal renderer error).
    pub fn terminate(&mut self) {
        self.state = AppState::Terminating;
    }

    /// Lifecycle state.
    pub fn state(&self) -> AppState {
        self.state
    }

    /// Description of the event source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Rows to display, oldest first.
    pub fn rows(&self) -> vec_deque::Iter<'_, AuditRecord> {
        self.history.iter()
    }

    /// The bounded history backing the rows.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Records received since start.
    pub fn total_received(&self) -> u64 {
        self.total_received
    }

    /// Records dropped from the window since start.
    pub fn total_evicted(&self) -> u64 {
        self.history.evicted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MAX_ROWS;

    fn new_app() -> App {
        App::new("/tmp/test.sock (stream)".to_string(), MAX_ROWS)
    }

    fn record(detail: &str) -> AppEvent {
        AppEvent::Record(AuditRecord::new("INFO", "u", detail))
    }

    #[test]
    fn record_is_appended_and_rendered() {
        let mut app = new_app();

        let actions = app.handle(record("E0"));

        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(app.rows().map(AuditRecord::detail).collect::<Vec<_>>(), vec!["E0"]);
        assert_eq!(app.total_received(), 1);
    }

    #[test]
    fn quit_keys_terminate() {
        for key in [KeyInput::Char('q'), KeyInput::Char('Q'), KeyInput::Esc, KeyInput::CtrlC] {
            let mut app = new_app();

            let actions = app.handle(AppEvent::Key(key));

            assert_eq!(actions, vec![AppAction::Quit], "{key:?} should quit");
            assert_eq!(app.state(), AppState::Terminating);
        }
    }

    #[test]
    fn interrupt_terminates() {
        let mut app = new_app();

        assert_eq!(app.handle(AppEvent::Interrupt), vec![AppAction::Quit]);
        assert_eq!(app.state(), AppState::Terminating);
    }

    #[test]
    fn other_keys_are_ignored() {
        let mut app = new_app();

        assert!(app.handle(AppEvent::Key(KeyInput::Char('x'))).is_empty());
        assert_eq!(app.state(), AppState::Running);
    }

    #[test]
    fn events_after_quit_are_ignored() {
        let mut app = new_app();
        let _ = app.handle(AppEvent::Key(KeyInput::Esc));

        assert!(app.handle(record("late")).is_empty());
        assert!(app.handle(AppEvent::Key(KeyInput::Esc)).is_empty());
        assert_eq!(app.rows().len(), 0);
        assert_eq!(app.total_received(), 0);
    }

    #[test]
    fn resize_renders() {
        let mut app = new_app();

        assert_eq!(app.handle(AppEvent::Resize(120, 40)), vec![AppAction::Render]);
        assert_eq!(app.state(), AppState::Running);
    }

    #[test]
    fn tick_is_a_no_op() {
        let mut app = new_app();

        assert!(app.handle(AppEvent::Tick).is_empty());
    }

    #[test]
    fn counters_track_eviction() {
        let mut app = App::new("test".to_string(), 2);
        for i in 0..5 {
            let _ = app.handle(record(&format!("E{i}")));
        }

        assert_eq!(app.total_received(), 5);
        assert_eq!(app.total_evicted(), 3);
        assert_eq!(app.rows().map(AuditRecord::detail).collect::<Vec<_>>(), vec!["E3", "E4"]);
    }

    #[test]
    fn terminate_stops_processing() {
        let mut app = new_app();
        app.terminate();

        assert_eq!(app.state(), AppState::Terminating);
        assert!(app.handle(record("E0")).is_empty());
    }
}
