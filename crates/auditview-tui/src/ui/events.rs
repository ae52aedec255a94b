//! Audit event table
//!
//! One row per record in the history window, oldest at the top.

use auditview_app::App;
use auditview_proto::UNKNOWN_EVENT_TYPE;
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table},
};

const BORDER_SIZE: u16 = 2;
const HEADER_HEIGHT: u16 = 1;
const TYPE_WIDTH: u16 = 12;
const USER_WIDTH: u16 = 16;

/// Render the event table.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Audit events ");

    if app.history().is_empty() {
        let waiting = Paragraph::new(Line::from(Span::styled(
            "Waiting for audit events...",
            Style::default().fg(Color::DarkGray),
        )))
        .block(block);
        frame.render_widget(waiting, area);
        return;
    }

    // Keep the newest rows when the terminal is too short for the window
    let visible_height = usize::from(area.height.saturating_sub(BORDER_SIZE + HEADER_HEIGHT));
    let skip = app.history().len().saturating_sub(visible_height);

    let rows: Vec<Row> = app
        .rows()
        .skip(skip)
        .map(|record| {
            let type_style = if record.event_type() == UNKNOWN_EVENT_TYPE {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            };

            Row::new(vec![
                Span::styled(record.event_type().to_string(), type_style),
                Span::styled(record.user().to_string(), Style::default().fg(Color::Green)),
                Span::raw(record.detail().to_string()),
            ])
        })
        .collect();

    let header = Row::new(vec!["TYPE", "USER", "DETAIL"])
        .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));

    let widths =
        [Constraint::Length(TYPE_WIDTH), Constraint::Length(USER_WIDTH), Constraint::Min(10)];

    let table = Table::new(rows, widths).header(header).block(block);

    frame.render_widget(table, area);
}
