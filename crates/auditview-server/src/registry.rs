//! Registry of live connection tasks.
//!
//! Every accepted producer connection runs on its own task. The registry
//! owns those tasks so that shutdown can cancel and join all of them
//! instead of leaving them for process exit to reclaim.

use std::{fmt, future::Future};

use tokio::task::JoinSet;

/// Identifier of an accepted connection, unique for the listener's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Tracks connection tasks spawned by the accept loop.
///
/// Each task resolves to its own [`ConnectionId`] so finished connections
/// can be reported as they are reaped.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    tasks: JoinSet<ConnectionId>,
    next_id: u64,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a connection task built from its freshly assigned id.
    pub fn spawn<F, Fut>(&mut self, connection: F) -> ConnectionId
    where
        F: FnOnce(ConnectionId) -> Fut,
        Fut: Future<Output = ConnectionId> + Send + 'static,
    {
        let id = ConnectionId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.tasks.spawn(connection(id));
        id
    }

    /// Number of connections not yet reaped.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no connection is being tracked.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Connections accepted since creation.
    pub fn total_accepted(&self) -> u64 {
        self.next_id
    }

    /// Wait for the next connection task to finish.
    ///
    /// Returns `None` when no connection is tracked. A task that panicked or
    /// was cancelled is logged and reported as `None` as well.
    pub async fn join_next(&mut self) -> Option<ConnectionId> {
        match self.tasks.join_next().await? {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Connection task failed: {}", e);
                None
            },
        }
    }

    /// Cancel every connection task and wait until all have stopped.
    pub async fn shutdown(&mut self) {
        let active = self.tasks.len();
        self.tasks.abort_all();
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result
                && !e.is_cancelled()
            {
                tracing::warn!("Connection task failed during shutdown: {}", e);
            }
        }
        tracing::debug!(active, "connection tasks joined");
    }
}
