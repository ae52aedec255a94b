//! Listener configuration.

use std::{fmt, path::PathBuf};

use auditview_proto::DEFAULT_MAX_MESSAGE_LEN;

/// Default endpoint path.
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/ui_monitor.sock";

/// Default endpoint permissions.
///
/// World read/write: the producer runs as a different (privileged) user than
/// the display, and both must be able to open the socket.
pub const DEFAULT_PERMISSIONS: u32 = 0o666;

/// Socket type of the local endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TransportMode {
    /// Connection-oriented (`SOCK_STREAM`), newline-delimited messages.
    #[default]
    Stream,
    /// Connectionless (`SOCK_DGRAM`), one message per datagram.
    Datagram,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream => write!(f, "stream"),
            Self::Datagram => write!(f, "datagram"),
        }
    }
}

/// Configuration for [`crate::Listener`].
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Filesystem path of the Unix socket.
    pub socket_path: PathBuf,
    /// Stream or datagram socket.
    pub mode: TransportMode,
    /// Mode bits applied to the socket file after binding.
    pub permissions: u32,
    /// Largest accepted message in bytes (line length or datagram size).
    pub max_message_len: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            mode: TransportMode::Stream,
            permissions: DEFAULT_PERMISSIONS,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
        }
    }
}
