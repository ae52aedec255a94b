//! auditview event ingestion.
//!
//! Owns the local endpoint that privileged producers write audit events to,
//! decodes every message and forwards the records through the event bridge
//! to the single display consumer.
//!
//! # Architecture
//!
//! ```text
//! producer ─┐
//! producer ─┼─> Listener (accept loop, one task per connection)
//! producer ─┘        │ decode
//!                    v
//!              RecordSender ──mpsc──> display (single consumer)
//! ```
//!
//! Transport errors stay inside the task that hit them: a failed accept is
//! logged and retried, a failed read ends that connection only. Only binding
//! the endpoint can fail the caller.
//!
//! # Components
//!
//! - [`Listener`]: binds the endpoint and spawns the ingestion tasks
//! - [`ListenerHandle`]: structured shutdown of everything the listener spawned
//! - [`ConnectionRegistry`]: tracks per-connection tasks so shutdown can join them
//! - [`RecordSender`]: producer side of the event bridge
//! - [`Producer`]: client used by the `auditview-emit` tool and tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod bridge;
mod config;
mod error;
mod listener;
mod producer;
mod registry;

pub use bridge::{BridgeClosed, DEFAULT_CHANNEL_CAPACITY, RecordSender};
pub use config::{DEFAULT_PERMISSIONS, DEFAULT_SOCKET_PATH, ListenerConfig, TransportMode};
pub use error::{ConnectionReadError, ListenerError};
pub use listener::{Listener, ListenerHandle};
pub use producer::Producer;
pub use registry::{ConnectionId, ConnectionRegistry};
