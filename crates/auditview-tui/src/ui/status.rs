//! Status bar
//!
//! Displays the event source, window fill and counters.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::App;

/// Status bar text for `app`.
pub fn status_text(app: &App) -> String {
    let history = app.history();
    format!(
        "{} | rows {}/{} | received {} | evicted {} | q: quit",
        app.source(),
        history.len(),
        history.capacity(),
        app.total_received(),
        app.total_evicted(),
    )
}

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let status_line = Line::from(vec![Span::raw(" "), Span::raw(status_text(app))]);

    let paragraph =
        Paragraph::new(status_line).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use auditview_app::{AppEvent, AuditRecord, KeyInput};

    use super::*;

    fn record(i: usize) -> AppEvent {
        AppEvent::Record(AuditRecord::new("INFO", "u", format!("E{i}")))
    }

    #[test]
    fn fresh_app() {
        let app = App::new("/tmp/ui_monitor.sock (stream)".into(), 15);

        insta::assert_snapshot!(
            status_text(&app),
            @"/tmp/ui_monitor.sock (stream) | rows 0/15 | received 0 | evicted 0 | q: quit"
        );
    }

    #[test]
    fn full_window_counts_evictions() {
        let mut app = App::new("/run/audit.sock (datagram)".into(), 15);
        for i in 0..20 {
            let _ = app.handle(record(i));
        }

        insta::assert_snapshot!(
            status_text(&app),
            @"/run/audit.sock (datagram) | rows 15/15 | received 20 | evicted 5 | q: quit"
        );
    }

    #[test]
    fn counters_freeze_after_quit() {
        let mut app = App::new("s (stream)".into(), 2);
        let _ = app.handle(record(0));
        let _ = app.handle(AppEvent::Key(KeyInput::Esc));
        let _ = app.handle(record(1));

        insta::assert_snapshot!(
            status_text(&app),
            @"s (stream) | rows 1/2 | received 1 | evicted 0 | q: quit"
        );
    }
}
