//! Producer side of the local endpoint.
//!
//! Used by the `auditview-emit` tool and by tests to write audit events the
//! way a privileged producer would.

use std::{io, path::Path};

use auditview_proto::AuditRecord;
use tokio::{
    io::AsyncWriteExt,
    net::{UnixDatagram, UnixStream},
};

use crate::TransportMode;

/// Connected producer socket.
#[derive(Debug)]
pub enum Producer {
    /// Newline-delimited messages over one connection.
    Stream(UnixStream),
    /// One message per datagram.
    Datagram(UnixDatagram),
}

impl Producer {
    /// Connect to the endpoint at `path`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if nothing is listening at `path` or the
    /// socket type does not match.
    pub async fn connect(path: impl AsRef<Path>, mode: TransportMode) -> io::Result<Self> {
        let path = path.as_ref();
        match mode {
            TransportMode::Stream => Ok(Self::Stream(UnixStream::connect(path).await?)),
            TransportMode::Datagram => {
                let socket = UnixDatagram::unbound()?;
                socket.connect(path)?;
                Ok(Self::Datagram(socket))
            },
        }
    }

    /// Socket type of this producer.
    pub fn mode(&self) -> TransportMode {
        match self {
            Self::Stream(_) => TransportMode::Stream,
            Self::Datagram(_) => TransportMode::Datagram,
        }
    }

    /// Encode and send one record.
    pub async fn send(&mut self, record: &AuditRecord) -> io::Result<()> {
        self.send_raw(&record.encode()).await
    }

    /// Send one message as-is.
    ///
    /// In stream mode the terminating newline is appended. A message that
    /// itself contains a newline arrives as several messages.
    pub async fn send_raw(&mut self, message: &str) -> io::Result<()> {
        match self {
            Self::Stream(stream) => {
                let mut line = Vec::with_capacity(message.len() + 1);
                line.extend_from_slice(message.as_bytes());
                line.push(b'\n');
                stream.write_all(&line).await
            },
            Self::Datagram(socket) => {
                let sent = socket.send(message.as_bytes()).await?;
                if sent < message.len() {
                    return Err(io::Error::new(io::ErrorKind::WriteZero, "datagram truncated"));
                }
                Ok(())
            },
        }
    }

    /// Flush and close the write side.
    ///
    /// A stream listener sees end-of-stream after this. No-op for datagrams.
    pub async fn finish(&mut self) -> io::Result<()> {
        match self {
            Self::Stream(stream) => stream.shutdown().await,
            Self::Datagram(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn stream_messages_are_newline_terminated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.sock");
        let listener = tokio::net::UnixListener::bind(&path).unwrap();

        let mut producer = Producer::connect(&path, TransportMode::Stream).await.unwrap();
        let (mut server, _) = listener.accept().await.unwrap();

        producer.send(&AuditRecord::new("LOGIN", "alice", "ok")).await.unwrap();
        producer.send_raw("raw").await.unwrap();
        producer.finish().await.unwrap();

        let mut received = String::new();
        server.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "LOGIN|alice|ok\nraw\n");
    }

    #[tokio::test]
    async fn datagram_is_one_message() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("d.sock");
        let server = UnixDatagram::bind(&path).unwrap();

        let mut producer = Producer::connect(&path, TransportMode::Datagram).await.unwrap();
        assert_eq!(producer.mode(), TransportMode::Datagram);
        producer.send(&AuditRecord::new("EXEC", "root", "a|b")).await.unwrap();

        let mut buf = [0u8; 64];
        let n = server.recv(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], b"EXEC|root|a|b");
    }

    #[tokio::test]
    async fn connect_without_listener_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sock");

        assert!(Producer::connect(&path, TransportMode::Stream).await.is_err());
        assert!(Producer::connect(&path, TransportMode::Datagram).await.is_err());
    }
}
