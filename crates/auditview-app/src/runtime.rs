//! Generic render loop.
//!
//! The Runtime is the single consumer of the event bridge. Each cycle it
//! waits for whichever arrives first, a user-interface event from the
//! [`Driver`] or an audit record from the bridge, feeds exactly that one
//! input to the [`App`] and executes the resulting actions.

use auditview_proto::AuditRecord;
use tokio::sync::mpsc;

use crate::{App, AppAction, AppEvent, Driver};

/// Render loop that owns the [`App`] and drains the event bridge.
///
/// # Type Parameters
///
/// - `D`: Platform-specific input and rendering driver
pub struct Runtime<D: Driver> {
    driver: D,
    app: App,
    records: mpsc::Receiver<AuditRecord>,
    /// `false` once every producer has dropped its sender.
    records_open: bool,
}

impl<D: Driver> Runtime<D> {
    /// Create a runtime consuming `records` into `app`.
    pub fn new(driver: D, app: App, records: mpsc::Receiver<AuditRecord>) -> Self {
        Self { driver, app, records, records_open: true }
    }

    /// Run until the App asks to quit.
    ///
    /// Pending records still queued in the bridge at quit time are dropped
    /// with the receiver.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to read input or to render.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.render()?;

        loop {
            let should_quit = self.step().await?;
            if should_quit {
                break;
            }
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to read input or to render.
    pub async fn step(&mut self) -> Result<bool, D::Error> {
        let Some(event) = self.next_event().await? else {
            return Ok(false);
        };

        let actions = self.app.handle(event);
        self.process_actions(actions)
    }

    /// Wait for the next input from either source.
    ///
    /// User input is polled first so a quit request is honoured even while
    /// producers keep the bridge full.
    async fn next_event(&mut self) -> Result<Option<AppEvent>, D::Error> {
        let Self { driver, records, records_open, .. } = self;

        if !*records_open {
            return driver.poll_event().await;
        }

        tokio::select! {
            biased;

            input = driver.poll_event() => input,

            record = records.recv() => match record {
                Some(record) => Ok(Some(AppEvent::Record(record))),
                None => {
                    tracing::info!("all event producers have stopped");
                    *records_open = false;
                    Ok(None)
                },
            },
        }
    }

    /// Execute actions returned by the App.
    ///
    /// Returns `true` if should quit.
    fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, D::Error> {
        for action in actions {
            match action {
                AppAction::Render => self.render()?,
                AppAction::Quit => return Ok(true),
            }
        }
        Ok(false)
    }

    /// Redraw, treating any renderer failure as fatal.
    fn render(&mut self) -> Result<(), D::Error> {
        if let Err(e) = self.driver.render(&self.app) {
            tracing::error!("Renderer failed, shutting down: {}", e);
            self.app.terminate();
            self.driver.stop();
            return Err(e);
        }
        Ok(())
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }
}
