//! Typed errors for the protocol engine with a per-class exit status
//!
//! Every fallible operation propagates a `ClientError`; the binary's
//! top level is the only place that turns one into a process exit.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Bad CLI input; rejected before any network activity.
    #[error("{0}")]
    Usage(String),

    /// Connect/read/write failure on a socket.
    #[error("{context}: {source}")]
    Transport { context: String, source: io::Error },

    /// The server answered with an ERROR message.
    #[error("server error ({0})")]
    Server(String),

    /// Bad header or field, invalid name, or a length mismatch.
    #[error("{0}")]
    Protocol(String),

    /// Open/create/read/write failure on a local file.
    #[error("{context}: {source}")]
    Filesystem { context: String, source: io::Error },
}

impl ClientError {
    pub fn transport(context: impl Into<String>, source: io::Error) -> Self {
        Self::Transport {
            context: context.into(),
            source,
        }
    }

    pub fn filesystem(context: impl Into<String>, source: io::Error) -> Self {
        Self::Filesystem {
            context: context.into(),
            source,
        }
    }

    /// Process exit status for this error class.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => 1,
            Self::Transport { .. } | Self::Server(_) => 2,
            Self::Protocol(_) => 3,
            Self::Filesystem { .. } => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_per_class() {
        assert_eq!(ClientError::Usage("bad channel".into()).exit_code(), 1);
        assert_eq!(
            ClientError::transport("connect", io::Error::from(io::ErrorKind::ConnectionRefused))
                .exit_code(),
            2
        );
        assert_eq!(ClientError::Server("channel full".into()).exit_code(), 2);
        assert_eq!(ClientError::Protocol("bad header".into()).exit_code(), 3);
        assert_eq!(
            ClientError::filesystem("open", io::Error::from(io::ErrorKind::NotFound)).exit_code(),
            5
        );
    }

    #[test]
    fn test_transport_display_includes_context() {
        let e = ClientError::transport(
            "connect 127.0.0.1:7101",
            io::Error::from(io::ErrorKind::ConnectionRefused),
        );
        assert!(e.to_string().starts_with("connect 127.0.0.1:7101: "));
    }
}
