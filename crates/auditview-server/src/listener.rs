//! Unix socket listener.
//!
//! Binds the local endpoint and spawns the ingestion tasks:
//!
//! - **Stream**: an accept loop plus one task per producer connection. Each
//!   connection task frames newline-delimited messages until end-of-stream
//!   or a read error.
//! - **Datagram**: a single receive task; each datagram is one message.
//!
//! Every message is decoded and forwarded through the [`RecordSender`].

use std::{
    fs,
    future::Future,
    io,
    os::unix::fs::{FileTypeExt, PermissionsExt},
    path::{Path, PathBuf},
    time::Duration,
};

use auditview_proto::{LineFramer, MAX_TERMINATOR_LEN, datagram_message};
use tokio::{
    io::AsyncReadExt,
    net::{UnixDatagram, UnixListener, UnixStream},
    sync::watch,
    task::JoinHandle,
};

use crate::{
    ConnectionId, ConnectionReadError, ConnectionRegistry, ListenerConfig, ListenerError,
    RecordSender, TransportMode,
};

/// Read buffer size for stream connections.
const READ_BUF_SIZE: usize = 4096;

/// Pause after a failed accept so a persistent error (e.g. out of file
/// descriptors) does not spin the accept loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Entry point for binding the endpoint.
pub struct Listener;

impl Listener {
    /// Bind the endpoint described by `config` and start ingesting.
    ///
    /// Removes a stale socket left by a previous run, binds, relaxes the
    /// socket permissions and spawns the ingestion tasks. Must be called from
    /// within a tokio runtime.
    ///
    /// Only a socket is ever removed from `config.socket_path`. A regular
    /// file, directory or symlink there fails with
    /// [`ListenerError::NotASocket`] instead of being deleted.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError`] if the endpoint cannot be (re)created or its
    /// permissions cannot be set. Nothing is spawned in that case.
    pub fn bind(
        config: &ListenerConfig,
        bridge: RecordSender,
    ) -> Result<ListenerHandle, ListenerError> {
        let path = config.socket_path.clone();
        remove_stale_endpoint(&path)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = match config.mode {
            TransportMode::Stream => {
                let listener = UnixListener::bind(&path)
                    .map_err(|source| ListenerError::Bind { path: path.clone(), source })?;
                set_permissions(&path, config.permissions)?;
                tokio::spawn(accept_loop(listener, bridge, config.max_message_len, shutdown_rx))
            },
            TransportMode::Datagram => {
                let socket = UnixDatagram::bind(&path)
                    .map_err(|source| ListenerError::Bind { path: path.clone(), source })?;
                set_permissions(&path, config.permissions)?;
                tokio::spawn(receive_loop(socket, bridge, config.max_message_len, shutdown_rx))
            },
        };

        tracing::info!(path = %path.display(), mode = %config.mode, "Listening for audit events");

        Ok(ListenerHandle { path, mode: config.mode, shutdown: shutdown_tx, task })
    }
}

/// Handle to a bound endpoint and every task spawned for it.
///
/// Dropping the handle without calling [`ListenerHandle::shutdown`] also
/// stops ingestion, but nobody waits for the tasks and the socket file stays.
#[derive(Debug)]
pub struct ListenerHandle {
    path: PathBuf,
    mode: TransportMode,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Path of the bound socket.
    pub fn socket_path(&self) -> &Path {
        &self.path
    }

    /// Socket type of the endpoint.
    pub fn mode(&self) -> TransportMode {
        self.mode
    }

    /// Stop ingesting, join every spawned task and remove the socket file.
    ///
    /// Messages not yet forwarded are dropped.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);

        if let Err(e) = self.task.await {
            tracing::warn!("Listener task failed: {}", e);
        }

        match fs::remove_file(&self.path) {
            Ok(()) => {},
            Err(e) if e.kind() == io::ErrorKind::NotFound => {},
            Err(e) => tracing::warn!("Failed to remove {}: {}", self.path.display(), e),
        }

        tracing::info!(path = %self.path.display(), "Listener stopped");
    }
}

/// Remove a socket file left behind by a previous run.
///
/// Anything at the path that is not a socket is left alone.
fn remove_stale_endpoint(path: &Path) -> Result<(), ListenerError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(source) => return Err(ListenerError::StaleEndpoint { path: path.into(), source }),
    };

    if !metadata.file_type().is_socket() {
        return Err(ListenerError::NotASocket { path: path.into() });
    }

    tracing::debug!(path = %path.display(), "Removing stale endpoint");
    fs::remove_file(path).map_err(|source| ListenerError::StaleEndpoint { path: path.into(), source })
}

fn set_permissions(path: &Path, mode: u32) -> Result<(), ListenerError> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode)).map_err(|source| {
        ListenerError::Permissions { path: path.into(), mode, source }
    })
}

/// Source of producer connections for [`accept_loop`].
trait Accept: Send + 'static {
    fn next_connection(&mut self) -> impl Future<Output = io::Result<UnixStream>> + Send;
}

impl Accept for UnixListener {
    async fn next_connection(&mut self) -> io::Result<UnixStream> {
        let (stream, _addr) = self.accept().await?;
        Ok(stream)
    }
}

/// Source of whole datagrams for [`receive_loop`].
trait Receive: Send + 'static {
    fn receive(&mut self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>> + Send;
}

impl Receive for UnixDatagram {
    async fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.recv(buf).await
    }
}

/// Accept producers until shutdown, one task per connection.
///
/// A failed accept is logged and retried after a short pause.
async fn accept_loop(
    mut listener: impl Accept,
    bridge: RecordSender,
    max_message_len: usize,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut registry = ConnectionRegistry::new();

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,

            accepted = listener.next_connection() => match accepted {
                Ok(stream) => {
                    let bridge = bridge.clone();
                    let id = registry.spawn(|id| {
                        handle_connection(id, stream, bridge, max_message_len)
                    });
                    tracing::debug!(%id, active = registry.len(), "Producer connected");
                },
                Err(e) => {
                    tracing::warn!("{}", ListenerError::Accept(e));
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                },
            },

            Some(id) = registry.join_next() => {
                tracing::debug!(%id, active = registry.len(), "Connection reaped");
            },
        }
    }

    registry.shutdown().await;
    tracing::debug!(accepted = registry.total_accepted(), "Accept loop stopped");
}

/// Drive one producer connection to completion.
async fn handle_connection(
    id: ConnectionId,
    mut stream: UnixStream,
    bridge: RecordSender,
    max_message_len: usize,
) -> ConnectionId {
    match read_messages(&mut stream, &bridge, max_message_len).await {
        Ok(forwarded) => tracing::debug!(%id, forwarded, "Producer disconnected"),
        Err(e) => tracing::warn!(%id, "Socket read error: {}", e),
    }
    id
}

/// Forward newline-delimited messages until end-of-stream.
///
/// Returns the number of messages forwarded. Stops early, without error,
/// if the display has shut down.
async fn read_messages(
    stream: &mut UnixStream,
    bridge: &RecordSender,
    max_message_len: usize,
) -> Result<u64, ConnectionReadError> {
    let mut framer = LineFramer::new(max_message_len);
    let mut buf = vec![0u8; READ_BUF_SIZE];
    let mut forwarded: u64 = 0;

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            if let Some(message) = framer.finish()
                && bridge.forward(&message).await.is_ok()
            {
                forwarded = forwarded.saturating_add(1);
            }
            return Ok(forwarded);
        }

        framer.extend(&buf[..n]);
        while let Some(message) = framer.next_message()? {
            if bridge.forward(&message).await.is_err() {
                return Ok(forwarded);
            }
            forwarded = forwarded.saturating_add(1);
        }
    }
}

/// Receive datagrams until shutdown or a receive error.
async fn receive_loop(
    mut socket: impl Receive,
    bridge: RecordSender,
    max_message_len: usize,
    mut shutdown: watch::Receiver<bool>,
) {
    // Room for the terminator plus one byte, so truncation is detectable
    let mut buf = vec![0u8; max_message_len + MAX_TERMINATOR_LEN + 1];
    let mut forwarded: u64 = 0;

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,

            received = receive_one(&mut socket, &mut buf, max_message_len, &bridge) => match received {
                Ok(true) => forwarded = forwarded.saturating_add(1),
                Ok(false) => {},
                Err(ReceiveError::Io(e)) => {
                    tracing::warn!("Datagram receive error: {}", ConnectionReadError::Io(e));
                    break;
                },
                Err(ReceiveError::BridgeClosed) => break,
            },
        }
    }

    tracing::debug!(forwarded, "Datagram receiver stopped");
}

enum ReceiveError {
    Io(io::Error),
    BridgeClosed,
}

/// Receive and forward one datagram.
///
/// Returns `false` if nothing was forwarded: the datagram was empty or over
/// the length limit.
async fn receive_one(
    socket: &mut impl Receive,
    buf: &mut [u8],
    max_message_len: usize,
    bridge: &RecordSender,
) -> Result<bool, ReceiveError> {
    let n = socket.receive(buf).await.map_err(ReceiveError::Io)?;
    let message = match datagram_message(&buf[..n], max_message_len) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(received = n, "Dropping datagram: {}", ConnectionReadError::Framing(e));
            return Ok(false);
        },
    };
    if message.is_empty() {
        return Ok(false);
    }

    bridge.forward(&message).await.map_err(|_| ReceiveError::BridgeClosed)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use auditview_proto::AuditRecord;
    use tokio::{io::AsyncWriteExt, time::timeout};

    use super::*;
    use crate::bridge;

    const WAIT: Duration = Duration::from_secs(5);

    /// Fails a fixed number of accepts before handing out real connections.
    struct FlakyAcceptor {
        listener: UnixListener,
        failures: usize,
    }

    impl Accept for FlakyAcceptor {
        async fn next_connection(&mut self) -> io::Result<UnixStream> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::from(io::ErrorKind::ConnectionAborted));
            }
            self.listener.next_connection().await
        }
    }

    /// Replays scripted datagrams, then waits forever.
    struct ScriptedReceiver {
        script: VecDeque<io::Result<Vec<u8>>>,
    }

    impl Receive for ScriptedReceiver {
        async fn receive(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.script.pop_front() {
                Some(Ok(datagram)) => {
                    let n = datagram.len().min(buf.len());
                    buf[..n].copy_from_slice(&datagram[..n]);
                    Ok(n)
                },
                Some(Err(e)) => Err(e),
                None => std::future::pending().await,
            }
        }
    }

    #[tokio::test]
    async fn accept_errors_are_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.sock");
        let acceptor = FlakyAcceptor { listener: UnixListener::bind(&path).unwrap(), failures: 2 };
        let (tx, mut rx) = bridge::channel(4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(accept_loop(acceptor, tx, 64, shutdown_rx));

        let mut stream = UnixStream::connect(&path).await.unwrap();
        stream.write_all(b"A|b|c\n").await.unwrap();

        let record = timeout(WAIT, rx.recv()).await.unwrap();
        assert_eq!(record, Some(AuditRecord::new("A", "b", "c")));

        shutdown_tx.send(true).unwrap();
        timeout(WAIT, task).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn receive_error_stops_the_datagram_loop() {
        let receiver = ScriptedReceiver {
            script: VecDeque::from([
                Ok(b"A|b|c".to_vec()),
                Err(io::Error::from(io::ErrorKind::ConnectionReset)),
                Ok(b"D|e|f".to_vec()),
            ]),
        };
        let (tx, mut rx) = bridge::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        timeout(WAIT, receive_loop(receiver, tx, 64, shutdown_rx)).await.unwrap();

        assert_eq!(rx.recv().await, Some(AuditRecord::new("A", "b", "c")));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn oversized_datagram_is_dropped_not_truncated() {
        let receiver = ScriptedReceiver {
            script: VecDeque::from([
                Ok(b"INFO|u|0123456789".to_vec()),
                Ok(b"AB|c|def\r\n".to_vec()),
                Err(io::Error::from(io::ErrorKind::ConnectionReset)),
            ]),
        };
        let (tx, mut rx) = bridge::channel(4);
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);

        timeout(WAIT, receive_loop(receiver, tx, 8, shutdown_rx)).await.unwrap();

        assert_eq!(rx.recv().await, Some(AuditRecord::new("AB", "c", "def")));
        assert_eq!(rx.recv().await, None);
    }
}
