//! Full ingestion-to-render pipeline on real sockets.
//!
//! Wires a bound [`Listener`] through the event bridge into a
//! [`Runtime`] driven by a [`SimDriver`], the same way the `auditview`
//! binary wires it to the terminal.

use std::{io, path::Path};

use auditview_app::{App, Runtime};
use auditview_server::{
    Listener, ListenerConfig, ListenerError, ListenerHandle, Producer, TransportMode, bridge,
};
use tokio::task::JoinHandle;

use crate::{SimDriverError, SimHandle, sim_driver};

/// Running listener plus render loop.
#[derive(Debug)]
pub struct Pipeline {
    /// Input injection and frame observation.
    pub sim: SimHandle,
    listener: ListenerHandle,
    runtime: JoinHandle<Result<(), SimDriverError>>,
}

impl Pipeline {
    /// Bind `config` and start the render loop with `rows` rows and a bridge
    /// of `channel_capacity` records.
    pub fn start(
        config: &ListenerConfig,
        rows: usize,
        channel_capacity: usize,
    ) -> Result<Self, ListenerError> {
        let (tx, rx) = bridge::channel(channel_capacity);
        let listener = Listener::bind(config, tx)?;

        let (driver, sim) = sim_driver();
        let source = format!("{} ({})", config.socket_path.display(), config.mode);
        let runtime = Runtime::new(driver, App::new(source, rows), rx);

        Ok(Self { sim, listener, runtime: tokio::spawn(runtime.run()) })
    }

    /// Path of the bound socket.
    pub fn socket_path(&self) -> &Path {
        self.listener.socket_path()
    }

    /// Socket type of the endpoint.
    pub fn mode(&self) -> TransportMode {
        self.listener.mode()
    }

    /// Connect a new producer to the endpoint.
    pub async fn producer(&self) -> io::Result<Producer> {
        Producer::connect(self.socket_path(), self.mode()).await
    }

    /// Wait for the render loop to end, then shut the listener down.
    ///
    /// The loop only ends on quit or a render failure; inject one first.
    pub async fn finish(self) -> Result<(), SimDriverError> {
        let result = match self.runtime.await {
            Ok(result) => result,
            Err(e) => Err(SimDriverError(format!("runtime task failed: {e}"))),
        };

        self.listener.shutdown().await;
        tracing::debug!(ok = result.is_ok(), "pipeline finished");
        result
    }
}
