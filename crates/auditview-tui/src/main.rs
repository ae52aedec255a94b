//! auditview entry point.
//!
//! # Usage
//!
//! ```bash
//! # Listen on the default stream socket
//! auditview
//!
//! # Datagram socket elsewhere, logging at debug level
//! auditview --socket /run/audit/ui.sock --mode datagram --log-level debug
//! ```

use std::{fs::OpenOptions, path::PathBuf, sync::Arc};

use auditview_proto::DEFAULT_MAX_MESSAGE_LEN;
use auditview_server::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_SOCKET_PATH, Listener, ListenerConfig, TransportMode, bridge,
};
use auditview_tui::{App, Runtime, TerminalDriver};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default log file; the terminal itself belongs to the UI.
const DEFAULT_LOG_FILE: &str = "/tmp/auditview.log";

/// Live audit event display
#[derive(Parser, Debug)]
#[command(name = "auditview")]
#[command(about = "Terminal display for live security-audit events")]
#[command(version)]
struct Args {
    /// Path of the Unix socket producers write to
    #[arg(short, long, default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Socket type to listen on
    #[arg(short, long, value_enum, default_value_t = TransportMode::Stream)]
    mode: TransportMode,

    /// Number of most recent events kept on screen
    #[arg(short, long, default_value_t = auditview_app::MAX_ROWS)]
    rows: usize,

    /// Records buffered between the listener and the display
    #[arg(long, default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    channel_capacity: usize,

    /// Socket file mode, in octal
    #[arg(long, default_value = "666", value_parser = parse_octal_mode)]
    permissions: u32,

    /// Largest accepted message in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_MESSAGE_LEN)]
    max_message_len: usize,

    /// File to write logs to
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn listener_config(&self) -> ListenerConfig {
        ListenerConfig {
            socket_path: self.socket.clone(),
            mode: self.mode,
            permissions: self.permissions,
            max_message_len: self.max_message_len,
        }
    }
}

/// Parse permission bits like `666`, `0666` or `0o666`.
fn parse_octal_mode(s: &str) -> Result<u32, String> {
    let digits = s.strip_prefix("0o").unwrap_or(s);
    let mode = u32::from_str_radix(digits, 8).map_err(|e| format!("invalid octal mode: {e}"))?;
    if mode > 0o7777 {
        return Err(format!("mode {mode:o} out of range"));
    }
    Ok(mode)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_file = OpenOptions::new().create(true).append(true).open(&args.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Arc::new(log_file)).with_ansi(false))
        .with(filter)
        .init();

    tracing::info!("auditview starting");

    // Bind before taking over the terminal so failures print normally
    let config = args.listener_config();
    let (tx, rx) = bridge::channel(args.channel_capacity);
    let listener = Listener::bind(&config, tx)?;

    let source = format!("{} ({})", config.socket_path.display(), config.mode);
    let app = App::new(source, args.rows);

    // The driver restores the terminal when `run` drops it
    let result = match TerminalDriver::new() {
        Ok(driver) => Runtime::new(driver, app, rx).run().await,
        Err(e) => Err(e),
    };

    listener.shutdown().await;

    if let Err(e) = &result {
        tracing::error!("auditview stopped: {}", e);
    } else {
        tracing::info!("auditview stopped");
    }

    Ok(result?)
}
