//! Subscribe session: register a listener with the server and serve
//! inbound file pushes until cancelled
//!
//! Lifecycle: bind an ephemeral loopback listener, SUBSCRIBE with its
//! address, then run an unbounded accept loop that dispatches each
//! inbound connection to its own transfer task. A dedicated observer
//! task watches the cancellation channel and performs a best-effort
//! UNSUBSCRIBE before exiting the process; the observer and the accept
//! loop share only the immutable channel number and address, and
//! whichever reaches a terminal transition first wins.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::logger::TransferLogger;
use crate::net;
use crate::protocol::command;
use crate::transfer;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Run the subscribe session until the process exits.
///
/// `cancel` is the termination signal: when it fires, the observer task
/// unsubscribes and exits the process with success regardless of the
/// unsubscribe outcome. In-flight transfer tasks are abandoned at exit.
pub async fn run(
    cfg: ClientConfig,
    channel: i8,
    mut cancel: watch::Receiver<bool>,
    logger: Arc<dyn TransferLogger>,
) -> Result<(), ClientError> {
    // OS-assigned port; the server pushes files back to this address.
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| ClientError::transport("bind client listener", e))?;
    let address = listener
        .local_addr()
        .map_err(|e| ClientError::transport("resolve listener address", e))?
        .to_string();

    println!("Sending subscription request to server...");
    handshake(&cfg, command::SUBSCRIBE, channel, &address).await?;
    println!("Subscribed to channel {channel}");
    println!("Awaiting incoming file transfers on {address}...");
    logger.subscribed(channel, &address);

    // Cancellation observer: unsubscribe must never block shutdown, so
    // the result is reported and then the process exits 0 either way.
    {
        let cfg = cfg.clone();
        let address = address.clone();
        let logger = logger.clone();
        tokio::spawn(async move {
            if cancel.changed().await.is_ok() {
                eprintln!("\nCancelling subscription of {address} to channel {channel}...");
                match handshake(&cfg, command::UNSUBSCRIBE, channel, &address).await {
                    Ok(()) => {
                        eprintln!("Unsubscribed from channel {channel}");
                        logger.unsubscribed(channel, &address);
                    }
                    Err(e) => eprintln!("ERROR: unsubscribe failed: {e}"),
                }
                std::process::exit(0);
            }
        });
    }

    loop {
        let (conn, peer) = listener
            .accept()
            .await
            .map_err(|e| ClientError::transport("accept incoming connection", e))?;
        let _ = conn.set_nodelay(true);
        // Per-connection task; a failed transfer never stops the loop.
        let cfg = cfg.clone();
        let logger = logger.clone();
        tokio::spawn(async move {
            match transfer::receive_file(conn, channel, &cfg).await {
                Ok((path, bytes)) => {
                    println!("File {} received ({} bytes)", path.display(), bytes);
                    logger.received(channel, &path, bytes);
                }
                Err(e) => {
                    eprintln!("ERROR: transfer from {peer} failed: {e}");
                    logger.error("receive", &e.to_string());
                }
            }
        });
    }
}

/// One SUBSCRIBE/UNSUBSCRIBE request cycle: dial, send the control
/// message with the listener address as payload, decode the response.
pub async fn handshake(
    cfg: &ClientConfig,
    cmd: i8,
    channel: i8,
    address: &str,
) -> Result<(), ClientError> {
    let mut stream = net::connect(&cfg.server_addr).await?;
    net::write_message(&mut stream, cmd, channel, address.as_bytes()).await?;
    let (response, payload) = net::read_response(&mut stream).await?;
    match response {
        command::OK => Ok(()),
        command::ERROR => Err(ClientError::Server(
            String::from_utf8_lossy(&payload).into_owned(),
        )),
        other => Err(ClientError::Protocol(format!(
            "invalid command {other} in server response"
        ))),
    }
}
