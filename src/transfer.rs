//! File streaming: chunked send of local files, receive of pushed files
//!
//! The send path streams the body straight from the file handle in
//! fixed-size chunks; the receive path owns its connection and buffers
//! exclusively, so one instance can run per inbound connection with no
//! shared mutable state.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::net;
use crate::protocol::{self, command, FILENAME_LEN, HEADER_LEN};
use std::io;
use std::path::PathBuf;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Learn the exact size of an open file, leaving it positioned at the start.
///
/// The header must declare the content length before any payload bytes go
/// out, so the file is read through once to sink and then rewound; the
/// body is later streamed from the same handle.
pub async fn measure_file(file: &mut File) -> Result<u64, ClientError> {
    let size = tokio::io::copy(file, &mut tokio::io::sink())
        .await
        .map_err(|e| ClientError::filesystem("measure file length", e))?;
    file.seek(io::SeekFrom::Start(0))
        .await
        .map_err(|e| ClientError::filesystem("seek file to start", e))?;
    Ok(size)
}

/// Write a complete SEND message: header, filename field, then the file
/// body in `chunk_size` blocks. Fails if the streamed total does not
/// match the measured size.
pub async fn send_file(
    stream: &mut TcpStream,
    channel: i8,
    filename: &str,
    file: &mut File,
    file_size: u64,
    cfg: &ClientConfig,
) -> Result<(), ClientError> {
    let name_field = protocol::encode_filename(filename)?;
    let header = protocol::build_header(
        command::SEND,
        channel,
        protocol::file_content_length(file_size),
    );
    let mut prefix = Vec::with_capacity(HEADER_LEN + FILENAME_LEN);
    prefix.extend_from_slice(&header);
    prefix.extend_from_slice(&name_field);
    stream
        .write_all(&prefix)
        .await
        .map_err(|e| ClientError::transport("send message header", e))?;

    // Body streams from the file handle, not from a buffered copy.
    let mut scratch = vec![0u8; cfg.chunk_size];
    let mut sent: u64 = 0;
    loop {
        let n = file
            .read(&mut scratch)
            .await
            .map_err(|e| ClientError::filesystem("read file content", e))?;
        if n == 0 {
            break;
        }
        stream
            .write_all(&scratch[..n])
            .await
            .map_err(|e| ClientError::transport("send file content", e))?;
        sent += n as u64;
    }
    if sent != file_size {
        return Err(ClientError::Protocol(format!(
            "file sent incompletely (expected: {file_size}, sent: {sent})"
        )));
    }
    Ok(())
}

/// A rejected inbound transfer: the short machine-readable reason that
/// goes back to the peer in the ERROR reply, and the full local error.
struct Reject {
    wire: &'static str,
    error: ClientError,
}

impl Reject {
    fn protocol(wire: &'static str, msg: String) -> Self {
        Self {
            wire,
            error: ClientError::Protocol(msg),
        }
    }

    fn transport(wire: &'static str, context: &str, source: io::Error) -> Self {
        Self {
            wire,
            error: ClientError::transport(context, source),
        }
    }

    fn filesystem(wire: &'static str, context: String, source: io::Error) -> Self {
        Self {
            wire,
            error: ClientError::filesystem(context, source),
        }
    }
}

/// Handle one inbound file push on an accepted connection.
///
/// On full receipt the file is created under the configured download
/// directory and an OK reply is sent; any failure sends an ERROR reply
/// with a short reason, creates no file, and surfaces the local error.
/// Returns: (created path, content bytes)
pub async fn receive_file(
    mut stream: TcpStream,
    channel: i8,
    cfg: &ClientConfig,
) -> Result<(PathBuf, u64), ClientError> {
    match receive_inner(&mut stream, channel, cfg).await {
        Ok((path, bytes)) => {
            net::write_message(&mut stream, command::OK, channel, b"received").await?;
            Ok((path, bytes))
        }
        Err(reject) => {
            // Best-effort diagnostic before the connection drops
            let _ =
                net::write_message(&mut stream, command::ERROR, channel, reject.wire.as_bytes())
                    .await;
            Err(reject.error)
        }
    }
}

async fn receive_inner(
    stream: &mut TcpStream,
    channel: i8,
    cfg: &ClientConfig,
) -> Result<(PathBuf, u64), Reject> {
    let mut header = [0u8; HEADER_LEN];
    stream
        .read_exact(&mut header)
        .await
        .map_err(|e| Reject::transport("header read error", "read message header", e))?;
    let (cmd, msg_channel, content_length) = protocol::parse_header(&header);
    if cmd != command::SEND {
        return Err(Reject::protocol(
            "invalid command",
            format!("invalid command {cmd} (expected SEND)"),
        ));
    }
    if msg_channel != channel {
        return Err(Reject::protocol(
            "incorrect channel",
            format!("subscribed channel {channel} but message targets {msg_channel}"),
        ));
    }
    if content_length <= FILENAME_LEN as i64 {
        return Err(Reject::protocol(
            "invalid content length",
            format!("invalid content length {content_length} (must exceed {FILENAME_LEN})"),
        ));
    }

    let mut name_field = [0u8; FILENAME_LEN];
    stream
        .read_exact(&mut name_field)
        .await
        .map_err(|e| Reject::transport("filename read error", "read file name", e))?;
    let filename = protocol::decode_filename(&name_field);
    if filename.is_empty() {
        return Err(Reject::protocol(
            "empty filename",
            "message specified an empty file name".into(),
        ));
    }
    // Single-filename traversal defense: the name must stay inside the
    // download directory.
    if filename.contains(['/', '\\']) || filename == ".." {
        return Err(Reject::protocol(
            "invalid filename",
            format!("file name {filename:?} is not a plain base name"),
        ));
    }

    // Accumulate the body through a fixed scratch buffer; the file is
    // only created once every byte has arrived.
    let body_len = (content_length - FILENAME_LEN as i64) as u64;
    let mut content: Vec<u8> = Vec::new();
    let mut scratch = vec![0u8; cfg.chunk_size];
    let mut read_len: u64 = 0;
    while read_len < body_len {
        let n = stream
            .read(&mut scratch)
            .await
            .map_err(|e| Reject::transport("file read error", "read file content", e))?;
        if n == 0 {
            break; // peer closed early
        }
        content.extend_from_slice(&scratch[..n]);
        read_len += n as u64;
    }
    if read_len != body_len {
        return Err(Reject::protocol(
            "file incomplete read",
            format!("file content incomplete (expected: {body_len}, real: {read_len})"),
        ));
    }

    let path = cfg.download_dir.join(&filename);
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| {
            Reject::filesystem("file creation failed", format!("create {}", path.display()), e)
        })?;
    file.write_all(&content).await.map_err(|e| {
        Reject::filesystem("file write failed", format!("write {}", path.display()), e)
    })?;
    // tokio's File buffers writes in a background task; without an explicit
    // flush the data may still be in flight when the handle is dropped.
    file.flush().await.map_err(|e| {
        Reject::filesystem("file write failed", format!("write {}", path.display()), e)
    })?;

    Ok((path, body_len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[tokio::test]
    async fn test_measure_file_rewinds() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello world").unwrap();
        let mut file = File::open(tmp.path()).await.unwrap();

        let size = measure_file(&mut file).await.unwrap();
        assert_eq!(size, 11);

        // The handle must be back at the start for the streaming pass
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"hello world");
    }

    #[tokio::test]
    async fn test_measure_empty_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut file = File::open(tmp.path()).await.unwrap();
        assert_eq!(measure_file(&mut file).await.unwrap(), 0);
    }
}
