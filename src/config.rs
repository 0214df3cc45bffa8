//! Client configuration passed explicitly to every component
//!
//! There are no ambient globals: sessions and transfer handlers receive an
//! immutable `ClientConfig` at construction.

use crate::error::ClientError;
use crate::protocol::FILENAME_LEN;
use std::path::PathBuf;

pub const DEFAULT_SERVER_ADDR: &str = "127.0.0.1:7101";
pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const DEFAULT_MAX_CHANNEL: i8 = 8;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Rendezvous server address (host:port).
    pub server_addr: String,
    /// Directory where received files are created.
    pub download_dir: PathBuf,
    /// Scratch-buffer size for streaming file content.
    pub chunk_size: usize,
    /// Highest channel number the server accepts.
    pub max_channel: i8,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: DEFAULT_SERVER_ADDR.to_string(),
            download_dir: PathBuf::from("."),
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_channel: DEFAULT_MAX_CHANNEL,
        }
    }
}

impl ClientConfig {
    /// Validate a raw channel number against the configured bounds.
    /// Runs locally, before any connection is opened.
    pub fn validate_channel(&self, raw: i64) -> Result<i8, ClientError> {
        if raw < 1 {
            return Err(ClientError::Usage(
                "channel is outside valid range (min: 1)".into(),
            ));
        }
        if raw > i64::from(self.max_channel) {
            return Err(ClientError::Usage(format!(
                "channel is outside valid range (max: {})",
                self.max_channel
            )));
        }
        Ok(raw as i8)
    }

    /// Validate the configured field values themselves.
    /// Runs locally, before any connection is opened.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.chunk_size == 0 {
            return Err(ClientError::Usage("chunk size must be at least 1".into()));
        }
        Ok(())
    }
}

/// Validate the base name of an outgoing file against the fixed filename
/// field size. Runs locally, before any connection is opened.
pub fn validate_send_filename(name: &str) -> Result<(), ClientError> {
    if name.is_empty() {
        return Err(ClientError::Usage("file name is empty".into()));
    }
    if name.len() > FILENAME_LEN {
        return Err(ClientError::Usage(format!(
            "file name is too long (max length including file extension: {FILENAME_LEN} bytes)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_bounds() {
        let cfg = ClientConfig::default();
        assert_eq!(cfg.validate_channel(1).unwrap(), 1);
        assert_eq!(cfg.validate_channel(8).unwrap(), 8);
        assert!(cfg.validate_channel(0).is_err());
        assert!(cfg.validate_channel(-2).is_err());
    }

    #[test]
    fn test_channel_above_configured_max_is_usage_error() {
        let cfg = ClientConfig::default();
        match cfg.validate_channel(9) {
            Err(e @ ClientError::Usage(_)) => assert_eq!(e.exit_code(), 1),
            other => panic!("expected usage error, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_chunk_size_is_usage_error() {
        let cfg = ClientConfig {
            chunk_size: 0,
            ..ClientConfig::default()
        };
        match cfg.validate() {
            Err(e @ ClientError::Usage(_)) => assert_eq!(e.exit_code(), 1),
            other => panic!("expected usage error, got {other:?}"),
        }
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_send_filename_length_bounds() {
        assert!(validate_send_filename("test.txt").is_ok());
        assert!(validate_send_filename(&"a".repeat(FILENAME_LEN)).is_ok());
    }

    #[test]
    fn test_send_filename_41_bytes_is_usage_error() {
        match validate_send_filename(&"a".repeat(FILENAME_LEN + 1)) {
            Err(e @ ClientError::Usage(_)) => assert_eq!(e.exit_code(), 1),
            other => panic!("expected usage error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_send_filename_is_usage_error() {
        match validate_send_filename("") {
            Err(e @ ClientError::Usage(_)) => assert_eq!(e.exit_code(), 1),
            other => panic!("expected usage error, got {other:?}"),
        }
    }
}
