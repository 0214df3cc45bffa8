//! Send session: one-shot push of a single file to a channel

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::logger::TransferLogger;
use crate::net;
use crate::protocol::command;
use crate::transfer;
use std::path::Path;
use tokio::fs::File;

/// Dial the server, send one SEND message for `path`, and wait for the
/// terminal OK/ERROR response. Any failure at any step is fatal to the
/// operation; there are no retries.
pub async fn run(
    cfg: &ClientConfig,
    channel: i8,
    path: &Path,
    logger: &dyn TransferLogger,
) -> Result<(), ClientError> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ClientError::Usage(format!("{} has no file name", path.display())))?;

    let mut file = File::open(path)
        .await
        .map_err(|e| ClientError::filesystem(format!("open {}", path.display()), e))?;
    let file_size = transfer::measure_file(&mut file).await?;
    // A zero-length file would put content_length == 40 on the wire,
    // which every receiver rejects; fail before dialing instead.
    if file_size == 0 {
        return Err(ClientError::Usage(format!(
            "{} is empty, nothing to send",
            path.display()
        )));
    }

    println!("Connecting to {}...", cfg.server_addr);
    let mut stream = net::connect(&cfg.server_addr).await?;
    println!("Sending {} ({} bytes)...", filename, file_size);
    transfer::send_file(&mut stream, channel, &filename, &mut file, file_size, cfg).await?;

    println!("File sent. Awaiting server response...");
    let (response, payload) = net::read_response(&mut stream).await?;
    match response {
        command::OK => {
            println!(
                "Server received the file. It will be relayed to clients subscribed to channel {channel}."
            );
            logger.sent(channel, path, file_size);
            Ok(())
        }
        command::ERROR => Err(ClientError::Server(
            String::from_utf8_lossy(&payload).into_owned(),
        )),
        other => Err(ClientError::Protocol(format!(
            "invalid command {other} in server response"
        ))),
    }
}
