//! Event bridge between ingestion tasks and the display.
//!
//! A bounded multi-producer, single-consumer channel. Every connection task
//! holds a [`RecordSender`]; the render loop holds the only receiver. The
//! channel's internal synchronization is the single point where ingestion
//! and display meet.
//!
//! When the display falls behind, senders wait for room instead of dropping:
//! a slow producer is preferable to a lost audit event.

use auditview_proto::{AuditRecord, decode};
use thiserror::Error;
use tokio::sync::mpsc;

/// Default number of records buffered between producers and the display.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// The display consumer is gone; no further record can be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("display has shut down")]
pub struct BridgeClosed;

/// Producer half of the event bridge.
///
/// Cheap to clone; one clone per ingestion task.
#[derive(Debug, Clone)]
pub struct RecordSender {
    tx: mpsc::Sender<AuditRecord>,
}

impl RecordSender {
    /// Decode a raw message and deliver the record.
    ///
    /// Waits while the bridge is full.
    pub async fn forward(&self, raw: &str) -> Result<(), BridgeClosed> {
        self.send(decode(raw)).await
    }

    /// Deliver an already decoded record.
    ///
    /// Waits while the bridge is full.
    pub async fn send(&self, record: AuditRecord) -> Result<(), BridgeClosed> {
        self.tx.send(record).await.map_err(|_| BridgeClosed)
    }
}

/// Create a bridge buffering up to `capacity` records (at least one).
pub fn channel(capacity: usize) -> (RecordSender, mpsc::Receiver<AuditRecord>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (RecordSender { tx }, rx)
}
