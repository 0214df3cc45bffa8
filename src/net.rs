//! Framed message I/O over TCP connections
//!
//! Control-plane helpers shared by the send and subscribe sessions:
//! write a full header+payload message, read a header, read a complete
//! header+content response.

use crate::error::ClientError;
use crate::protocol::{self, HEADER_LEN, MAX_CONTROL_LEN};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Dial the rendezvous server.
pub async fn connect(addr: &str) -> Result<TcpStream, ClientError> {
    let stream = TcpStream::connect(addr)
        .await
        .map_err(|e| ClientError::transport(format!("connect {addr}"), e))?;
    let _ = stream.set_nodelay(true);
    Ok(stream)
}

/// Write a complete message: header, then payload.
pub async fn write_message(
    stream: &mut TcpStream,
    command: i8,
    channel: i8,
    payload: &[u8],
) -> Result<(), ClientError> {
    let header = protocol::build_header(command, channel, payload.len() as i64);
    let mut msg = Vec::with_capacity(HEADER_LEN + payload.len());
    msg.extend_from_slice(&header);
    msg.extend_from_slice(payload);
    stream
        .write_all(&msg)
        .await
        .map_err(|e| ClientError::transport("write message", e))
}

/// Read exactly one 10-byte header.
pub async fn read_header(stream: &mut TcpStream) -> Result<(i8, i8, i64), ClientError> {
    let mut header = [0u8; HEADER_LEN];
    stream
        .read_exact(&mut header)
        .await
        .map_err(|e| ClientError::transport("read message header", e))?;
    Ok(protocol::parse_header(&header))
}

/// Read one complete control response: header, then exactly
/// `content_length` payload bytes.
/// Returns: (command, payload)
pub async fn read_response(stream: &mut TcpStream) -> Result<(i8, Vec<u8>), ClientError> {
    let (command, _channel, content_length) = read_header(stream).await?;
    if content_length < 0 || content_length > MAX_CONTROL_LEN {
        return Err(ClientError::Protocol(format!(
            "response content length out of range: {content_length} (max: {MAX_CONTROL_LEN})"
        )));
    }
    let mut payload = vec![0u8; content_length as usize];
    if content_length > 0 {
        stream
            .read_exact(&mut payload)
            .await
            .map_err(|e| ClientError::transport("read response content", e))?;
    }
    Ok((command, payload))
}
