//! Shared wire-format constants and codec for the channel relay protocol
//!
//! Every message starts with a fixed 10-byte header:
//! `[0]=command(i8) [1]=channel(i8) [2..10]=content_length(i64, little-endian)`.
//! File transfers carry a 40-byte null-padded filename field followed by the
//! raw file bytes; control messages carry their payload directly.

use crate::error::ClientError;

/// Fixed header size for every message.
pub const HEADER_LEN: usize = 10;

/// Fixed size of the null-padded filename field in SEND payloads.
pub const FILENAME_LEN: usize = 40;

// Control payloads are short strings ("host:port", diagnostics). Cap them
// so a corrupt length field cannot drive an oversized allocation.
pub const MAX_CONTROL_LEN: i64 = 4096;

// Command ids (keep numeric stable for wire compat)
pub mod command {
    pub const SUBSCRIBE: i8 = 0;
    pub const SEND: i8 = 1;
    pub const OK: i8 = 2;
    pub const ERROR: i8 = 3;
    pub const UNSUBSCRIBE: i8 = 4;
}

/// Build a message header.
pub fn build_header(command: i8, channel: i8, content_length: i64) -> [u8; HEADER_LEN] {
    let mut header = [0u8; HEADER_LEN];
    header[0] = command as u8;
    header[1] = channel as u8;
    header[2..10].copy_from_slice(&content_length.to_le_bytes());
    header
}

/// Parse a message header.
/// Returns: (command, channel, content_length)
///
/// Any 10 bytes parse; validating the fields against the current
/// operation is the caller's job.
pub fn parse_header(header: &[u8; HEADER_LEN]) -> (i8, i8, i64) {
    let mut len = [0u8; 8];
    len.copy_from_slice(&header[2..10]);
    (header[0] as i8, header[1] as i8, i64::from_le_bytes(len))
}

/// Encode a filename into the fixed 40-byte null-padded field.
/// Fails on empty names and on names whose encoding exceeds 40 bytes.
pub fn encode_filename(name: &str) -> Result<[u8; FILENAME_LEN], ClientError> {
    let bytes = name.as_bytes();
    if bytes.is_empty() {
        return Err(ClientError::Protocol("file name is empty".into()));
    }
    if bytes.len() > FILENAME_LEN {
        return Err(ClientError::Protocol(format!(
            "file name too long: {} bytes (max: {})",
            bytes.len(),
            FILENAME_LEN
        )));
    }
    let mut field = [0u8; FILENAME_LEN];
    field[..bytes.len()].copy_from_slice(bytes);
    Ok(field)
}

/// Decode the 40-byte filename field: bytes up to the first NUL.
/// May decode to empty; callers must treat that as invalid.
pub fn decode_filename(field: &[u8; FILENAME_LEN]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(FILENAME_LEN);
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Content length declared by a SEND message for a file of the given size.
pub fn file_content_length(file_size: u64) -> i64 {
    FILENAME_LEN as i64 + file_size as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let header = build_header(command::SEND, 4, 51);
        let (cmd, channel, len) = parse_header(&header);
        assert_eq!(cmd, command::SEND);
        assert_eq!(channel, 4);
        assert_eq!(len, 51);
    }

    #[test]
    fn test_header_round_trip_all_commands() {
        for cmd in [
            command::SUBSCRIBE,
            command::SEND,
            command::OK,
            command::ERROR,
            command::UNSUBSCRIBE,
        ] {
            let header = build_header(cmd, 1, 0);
            assert_eq!(parse_header(&header).0, cmd);
        }
    }

    #[test]
    fn test_header_negative_channel_survives() {
        // Channel is a signed byte on the wire
        let header = build_header(command::SEND, -3, 100);
        let (_, channel, _) = parse_header(&header);
        assert_eq!(channel, -3);
    }

    #[test]
    fn test_header_length_is_little_endian() {
        let header = build_header(command::OK, 1, 0x0102);
        assert_eq!(header[2], 0x02);
        assert_eq!(header[3], 0x01);
        assert_eq!(&header[4..10], &[0u8; 6]);
    }

    #[test]
    fn test_filename_round_trip() {
        let field = encode_filename("test.txt").unwrap();
        assert_eq!(field.len(), FILENAME_LEN);
        assert_eq!(decode_filename(&field), "test.txt");
    }

    #[test]
    fn test_filename_exactly_max_length() {
        let name = "a".repeat(FILENAME_LEN);
        let field = encode_filename(&name).unwrap();
        assert_eq!(decode_filename(&field), name);
    }

    #[test]
    fn test_filename_too_long_rejected() {
        let name = "a".repeat(FILENAME_LEN + 1);
        assert!(encode_filename(&name).is_err());
    }

    #[test]
    fn test_empty_filename_rejected() {
        assert!(encode_filename("").is_err());
    }

    #[test]
    fn test_decode_all_nul_field_is_empty() {
        let field = [0u8; FILENAME_LEN];
        assert_eq!(decode_filename(&field), "");
    }

    #[test]
    fn test_file_content_length() {
        assert_eq!(file_content_length(0), 40);
        assert_eq!(file_content_length(11), 51);
    }
}
