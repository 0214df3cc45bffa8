//! Filechan - send and receive files using channels through a TCP server
//!
//! Thin binary over the library: CLI parsing, local pre-checks before
//! any network activity, signal wiring, and the single place where a
//! typed error becomes a process exit status.

use clap::{Parser, Subcommand};
use filechan::config::{self, ClientConfig};
use filechan::error::ClientError;
use filechan::logger::{NoopLogger, TextLogger, TransferLogger};
use filechan::{send, subscribe};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "File sharing client: send and receive files using channels through a TCP server"
)]
struct Args {
    #[command(subcommand)]
    mode: Mode,

    /// Server address (host:port)
    #[arg(long, default_value = config::DEFAULT_SERVER_ADDR)]
    server: String,

    /// Highest channel number accepted by the server
    #[arg(long, default_value_t = config::DEFAULT_MAX_CHANNEL)]
    max_channel: i8,

    /// Chunk size in bytes for streaming file content
    #[arg(long, default_value_t = config::DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Write timestamped log entries to file
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Receive files sent by other clients to a channel
    Receive {
        /// Channel to subscribe to
        #[arg(long)]
        channel: i64,

        /// Download directory for received files
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Send a file to clients currently subscribed to a channel
    Send {
        /// File to send
        file: PathBuf,

        /// Destination channel
        #[arg(long)]
        channel: i64,
    },
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("ERROR: {e}");
        std::process::exit(e.exit_code());
    }
}

fn run(args: Args) -> Result<(), ClientError> {
    // Choose logger once; zero overhead in hot paths with NoopLogger
    let logger: Arc<dyn TransferLogger> = if let Some(ref p) = args.log_file {
        match TextLogger::new(p) {
            Ok(l) => Arc::new(l),
            Err(_) => Arc::new(NoopLogger),
        }
    } else {
        Arc::new(NoopLogger)
    };

    match args.mode {
        Mode::Receive { channel, path } => {
            let cfg = ClientConfig {
                server_addr: args.server,
                download_dir: path,
                chunk_size: args.chunk_size,
                max_channel: args.max_channel,
            };
            cfg.validate()?;
            let channel = cfg.validate_channel(channel)?;
            if !cfg.download_dir.is_dir() {
                return Err(ClientError::Usage(format!(
                    "download path is not a directory: {}",
                    cfg.download_dir.display()
                )));
            }

            // Termination signal drives an explicit cancellation channel;
            // the subscribe session owns the unsubscribe reaction.
            let (cancel_tx, cancel_rx) = tokio::sync::watch::channel(false);
            ctrlc::set_handler(move || {
                let _ = cancel_tx.send(true);
            })
            .expect("Error setting Ctrl-C handler");

            println!("Receive mode: channel {channel}");
            runtime()?.block_on(subscribe::run(cfg, channel, cancel_rx, logger))
        }
        Mode::Send { file, channel } => {
            let cfg = ClientConfig {
                server_addr: args.server,
                download_dir: PathBuf::from("."),
                chunk_size: args.chunk_size,
                max_channel: args.max_channel,
            };
            cfg.validate()?;
            let channel = cfg.validate_channel(channel)?;

            // Name-length pre-check before any connection is opened
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    ClientError::Usage(format!("{} has no file name", file.display()))
                })?;
            config::validate_send_filename(&filename)?;

            println!("Send mode: file {}, channel {channel}", file.display());
            runtime()?.block_on(send::run(&cfg, channel, &file, logger.as_ref()))
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, ClientError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ClientError::Protocol(format!("build tokio runtime: {e}")))
}
