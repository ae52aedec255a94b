//! Listener error types.
//!
//! Only [`ListenerError`] ever reaches the caller, and only from
//! [`crate::Listener::bind`]. Everything that goes wrong after binding is
//! contained in the task that hit it and reported through `tracing`.

use std::{io, path::PathBuf};

use auditview_proto::FramingError;
use thiserror::Error;

/// Errors from setting up or running the endpoint.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// A file from a previous run could not be removed.
    ///
    /// Fatal: the endpoint cannot be recreated.
    #[error("failed to remove stale endpoint {}: {source}", .path.display())]
    StaleEndpoint {
        /// Endpoint path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The path exists and is not a socket.
    ///
    /// Fatal: refusing to delete arbitrary files, whoever runs the display.
    #[error("refusing to replace {}: not a socket", .path.display())]
    NotASocket {
        /// Endpoint path.
        path: PathBuf,
    },

    /// Binding the socket failed (permission denied, directory missing, ...).
    ///
    /// Fatal: the process exits non-zero.
    #[error("failed to bind {}: {source}", .path.display())]
    Bind {
        /// Endpoint path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Relaxing the socket permissions failed.
    ///
    /// Fatal: the producer, running as another user, could not connect.
    #[error("failed to set mode {mode:o} on {}: {source}", .path.display())]
    Permissions {
        /// Endpoint path.
        path: PathBuf,
        /// Requested mode bits.
        mode: u32,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Accepting a connection failed.
    ///
    /// Transient: logged by the accept loop, which keeps running.
    #[error("accept failed: {0}")]
    Accept(#[source] io::Error),
}

/// Errors that end a single connection's read loop.
///
/// Never fatal to the process; other connections are unaffected.
#[derive(Debug, Error)]
pub enum ConnectionReadError {
    /// The socket read failed.
    #[error("read failed: {0}")]
    Io(#[from] io::Error),

    /// The producer violated the framing limits.
    #[error(transparent)]
    Framing(#[from] FramingError),
}
