//! auditview event producer.
//!
//! Writes audit events to a running display, the way the privileged host
//! component would. Meant for manual testing.
//!
//! # Usage
//!
//! ```bash
//! # One event
//! auditview-emit LOGIN alice via ssh
//!
//! # Twenty numbered events, 100ms apart, over a datagram socket
//! auditview-emit --mode datagram --count 20 --interval-ms 100
//! ```

use std::{path::PathBuf, time::Duration};

use auditview_proto::AuditRecord;
use auditview_server::{DEFAULT_SOCKET_PATH, Producer, TransportMode};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// auditview event producer
#[derive(Parser, Debug)]
#[command(name = "auditview-emit")]
#[command(about = "Send audit events to a running auditview display")]
#[command(version)]
struct Args {
    /// Path of the display's socket
    #[arg(short, long, default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Socket type the display listens on
    #[arg(short, long, value_enum, default_value_t = TransportMode::Stream)]
    mode: TransportMode,

    /// Send a burst of numbered events instead of a single one
    #[arg(short = 'n', long, conflicts_with = "event")]
    count: Option<u64>,

    /// User for numbered events
    #[arg(short, long, default_value = "simulated_user")]
    user: String,

    /// Pause between events in milliseconds
    #[arg(long, default_value = "0")]
    interval_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Single event: type, user, then the detail words
    #[arg(value_name = "EVENT", num_args = 2..)]
    event: Vec<String>,
}

impl Args {
    /// Records to send, in order.
    fn records(&self) -> Vec<AuditRecord> {
        if let Some(count) = self.count {
            return (0..count)
                .map(|i| AuditRecord::new("INFO", self.user.as_str(), format!("E{i}")))
                .collect();
        }

        match self.event.as_slice() {
            [event_type, user, detail @ ..] => {
                vec![AuditRecord::new(event_type.as_str(), user.as_str(), detail.join(" "))]
            },
            _ => Vec::new(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let records = args.records();
    if records.is_empty() {
        return Err("nothing to send: pass EVENT_TYPE USER DETAIL... or --count N".into());
    }

    let mut producer = Producer::connect(&args.socket, args.mode).await?;
    tracing::info!(path = %args.socket.display(), mode = %args.mode, "Connected");

    let interval = Duration::from_millis(args.interval_ms);
    for (i, record) in records.iter().enumerate() {
        if i > 0 && !interval.is_zero() {
            tokio::time::sleep(interval).await;
        }
        producer.send(record).await?;
        tracing::debug!("Sent {}", record);
    }

    producer.finish().await?;
    tracing::info!(sent = records.len(), "Done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_event_joins_detail_words() {
        let args = Args::parse_from(["auditview-emit", "LOGIN", "alice", "via", "ssh"]);

        assert_eq!(args.records(), vec![AuditRecord::new("LOGIN", "alice", "via ssh")]);
    }

    #[test]
    fn burst_numbers_events() {
        let args = Args::parse_from(["auditview-emit", "--count", "3", "--user", "u"]);
        let details: Vec<_> = args.records().iter().map(|r| r.encode()).collect();

        assert_eq!(details, vec!["INFO|u|E0", "INFO|u|E1", "INFO|u|E2"]);
    }

    #[test]
    fn single_event_needs_type_and_user() {
        assert!(Args::try_parse_from(["auditview-emit", "LOGIN"]).is_err());
    }

    #[test]
    fn mode_parses_from_name() {
        let args = Args::parse_from(["auditview-emit", "--mode", "datagram", "--count", "1"]);

        assert_eq!(args.mode, TransportMode::Datagram);
        assert_eq!(args.socket, PathBuf::from(DEFAULT_SOCKET_PATH));
    }
}
