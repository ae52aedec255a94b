//! Simulation driver implementing the Driver trait.
//!
//! `SimDriver` provides the same interface as the terminal driver but for
//! headless testing. It implements [`Driver`] so the same
//! [`auditview_app::Runtime`] orchestration code runs in both production and
//! tests. Input is injected through a [`SimHandle`]; every render is
//! published as a [`Frame`] the handle can wait on.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use auditview_app::{App, AppEvent, AppState, AuditRecord, Driver, KeyInput};
use tokio::sync::{mpsc, watch};

/// Error type for simulation driver.
#[derive(Debug, Clone)]
pub struct SimDriverError(pub String);

impl std::fmt::Display for SimDriverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SimDriverError: {}", self.0)
    }
}

impl std::error::Error for SimDriverError {}

/// What a render call drew.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// Number of render calls so far, this one included.
    pub render: u64,
    /// Rows on screen, oldest first.
    pub rows: Vec<AuditRecord>,
    /// Records received by the App.
    pub total_received: u64,
    /// Records evicted from the window.
    pub total_evicted: u64,
    /// App state at render time.
    pub state: AppState,
}

impl Frame {
    /// Detail column of every row, oldest first.
    pub fn details(&self) -> Vec<&str> {
        self.rows.iter().map(AuditRecord::detail).collect()
    }
}

/// Flags shared between the driver and its handle.
#[derive(Debug, Default)]
struct Flags {
    fail_render: AtomicBool,
    stopped: AtomicBool,
}

/// Simulation driver for headless testing.
///
/// Create with [`sim_driver`].
#[derive(Debug)]
pub struct SimDriver {
    events: mpsc::UnboundedReceiver<AppEvent>,
    frames: watch::Sender<Frame>,
    renders: u64,
    flags: Arc<Flags>,
}

/// Test-side handle: inject input and observe rendered frames.
#[derive(Debug, Clone)]
pub struct SimHandle {
    events: mpsc::UnboundedSender<AppEvent>,
    frames: watch::Receiver<Frame>,
    flags: Arc<Flags>,
}

/// Create a driver and the handle that controls it.
pub fn sim_driver() -> (SimDriver, SimHandle) {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (frame_tx, frame_rx) = watch::channel(Frame::default());
    let flags = Arc::new(Flags::default());

    let driver =
        SimDriver { events: event_rx, frames: frame_tx, renders: 0, flags: Arc::clone(&flags) };
    let handle = SimHandle { events: event_tx, frames: frame_rx, flags };
    (driver, handle)
}

impl SimHandle {
    /// Inject an `AppEvent` for processing.
    ///
    /// Silently dropped once the driver is gone.
    pub fn inject_event(&self, event: AppEvent) {
        let _ = self.events.send(event);
    }

    /// Inject a key press.
    pub fn press(&self, key: KeyInput) {
        self.inject_event(AppEvent::Key(key));
    }

    /// Press `q`.
    pub fn quit(&self) {
        self.press(KeyInput::Char('q'));
    }

    /// Make every following render fail.
    pub fn fail_renders(&self) {
        self.flags.fail_render.store(true, Ordering::SeqCst);
    }

    /// Whether the runtime has stopped the driver.
    pub fn is_stopped(&self) -> bool {
        self.flags.stopped.load(Ordering::SeqCst)
    }

    /// Most recently rendered frame.
    pub fn latest_frame(&self) -> Frame {
        self.frames.borrow().clone()
    }

    /// Wait until a rendered frame satisfies `predicate`.
    ///
    /// Checks the latest frame first. Returns `None` if the driver was
    /// dropped before a matching frame appeared.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&Frame) -> bool) -> Option<Frame> {
        let frame = self.frames.wait_for(predicate).await.ok()?;
        Some(frame.clone())
    }
}

impl Driver for SimDriver {
    type Error = SimDriverError;

    async fn poll_event(&mut self) -> Result<Option<AppEvent>, Self::Error> {
        match self.events.recv().await {
            Some(event) => Ok(Some(event)),
            // Handle dropped: behave like a terminal nobody types into
            None => std::future::pending().await,
        }
    }

    fn render(&mut self, app: &App) -> Result<(), Self::Error> {
        if self.flags.fail_render.load(Ordering::SeqCst) {
            return Err(SimDriverError("render failed".into()));
        }

        self.renders = self.renders.saturating_add(1);
        let frame = Frame {
            render: self.renders,
            rows: app.rows().cloned().collect(),
            total_received: app.total_received(),
            total_evicted: app.total_evicted(),
            state: app.state(),
        };
        self.frames.send_replace(frame);
        Ok(())
    }

    fn stop(&mut self) {
        self.flags.stopped.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn injected_events_are_polled_in_order() {
        let (mut driver, handle) = sim_driver();
        handle.inject_event(AppEvent::Tick);
        handle.quit();

        assert_eq!(driver.poll_event().await.unwrap(), Some(AppEvent::Tick));
        assert_eq!(
            driver.poll_event().await.unwrap(),
            Some(AppEvent::Key(KeyInput::Char('q')))
        );
    }

    #[test]
    fn render_publishes_frame() {
        let (mut driver, handle) = sim_driver();
        let mut app = App::new("test".into(), 2);
        for i in 0..3 {
            let _ = app.handle(AppEvent::Record(AuditRecord::new("INFO", "u", format!("E{i}"))));
        }

        driver.render(&app).unwrap();

        let frame = handle.latest_frame();
        assert_eq!(frame.render, 1);
        assert_eq!(frame.details(), vec!["E1", "E2"]);
        assert_eq!(frame.total_received, 3);
        assert_eq!(frame.total_evicted, 1);
    }

    #[test]
    fn failing_render_publishes_nothing() {
        let (mut driver, handle) = sim_driver();
        handle.fail_renders();

        assert!(driver.render(&App::new("test".into(), 1)).is_err());
        assert_eq!(handle.latest_frame(), Frame::default());
    }

    #[test]
    fn stop_is_visible_to_handle() {
        let (mut driver, handle) = sim_driver();
        assert!(!handle.is_stopped());

        driver.stop();
        assert!(handle.is_stopped());
    }
}
