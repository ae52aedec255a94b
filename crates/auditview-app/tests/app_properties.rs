//! Property-based tests for the App state machine.
//!
//! Tests verify that the bounded-history invariants hold under arbitrary
//! event sequences, not just the hand-picked ones in the unit tests.

use auditview_app::{App, AppAction, AppEvent, AppState, AuditRecord, History, KeyInput, MAX_ROWS};
use proptest::prelude::*;

/// Generate arbitrary audit records.
fn record_strategy() -> impl Strategy<Value = AuditRecord> {
    ("[A-Z]{1,8}", "[a-z]{1,8}", "[ -~]{0,24}")
        .prop_map(|(event_type, user, detail)| AuditRecord::new(event_type, user, detail))
}

/// Generate events that never quit.
fn non_quit_event_strategy() -> impl Strategy<Value = AppEvent> {
    prop_oneof![
        4 => record_strategy().prop_map(AppEvent::Record),
        1 => Just(AppEvent::Tick),
        1 => (1u16..200, 1u16..100).prop_map(|(c, r)| AppEvent::Resize(c, r)),
        1 => "[a-pr-z0-9]".prop_map(|s| {
            AppEvent::Key(KeyInput::Char(s.chars().next().unwrap_or('x')))
        }),
    ]
}

proptest! {
    #[test]
    fn prop_history_is_a_sliding_window(
        records in prop::collection::vec(record_strategy(), 1..60),
        capacity in 1usize..20,
    ) {
        let mut history = History::new(capacity);
        for record in &records {
            let _ = history.push(record.clone());
            prop_assert!(history.len() <= capacity);
        }

        // PROPERTY: Exactly the last min(N, capacity) records, in arrival order
        let kept = records.len().min(capacity);
        let expected = &records[records.len() - kept..];
        let actual: Vec<_> = history.iter().cloned().collect();
        prop_assert_eq!(actual.as_slice(), expected);
        prop_assert_eq!(history.evicted(), (records.len() - kept) as u64);
    }

    #[test]
    fn prop_app_rows_match_last_records(
        events in prop::collection::vec(non_quit_event_strategy(), 0..80),
    ) {
        let mut app = App::new("test".into(), MAX_ROWS);
        let mut records = Vec::new();

        for event in events {
            if let AppEvent::Record(record) = &event {
                records.push(record.clone());
            }
            let actions = app.handle(event);
            prop_assert!(!actions.contains(&AppAction::Quit));
            prop_assert!(app.rows().len() <= MAX_ROWS);
        }

        let kept = records.len().min(MAX_ROWS);
        let rows: Vec<_> = app.rows().cloned().collect();
        prop_assert_eq!(rows.as_slice(), &records[records.len() - kept..]);
        prop_assert_eq!(app.total_received(), records.len() as u64);
        prop_assert_eq!(app.state(), AppState::Running);
    }

    #[test]
    fn prop_nothing_changes_after_quit(
        before in prop::collection::vec(record_strategy(), 0..20),
        after in prop::collection::vec(non_quit_event_strategy(), 0..20),
    ) {
        let mut app = App::new("test".into(), MAX_ROWS);
        for record in before {
            let _ = app.handle(AppEvent::Record(record));
        }
        prop_assert_eq!(app.handle(AppEvent::Key(KeyInput::Esc)), vec![AppAction::Quit]);

        let rows: Vec<_> = app.rows().cloned().collect();
        let received = app.total_received();
        for event in after {
            prop_assert!(app.handle(event).is_empty());
        }

        // PROPERTY: Terminating is absorbing
        prop_assert_eq!(app.state(), AppState::Terminating);
        prop_assert_eq!(app.rows().cloned().collect::<Vec<_>>(), rows);
        prop_assert_eq!(app.total_received(), received);
    }
}
