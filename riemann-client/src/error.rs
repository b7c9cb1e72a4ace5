//! Client error types.
//!
//! Neither of these ever reaches a caller of [`crate::Client`]: connection and
//! transport failures are absorbed into backoff and an empty response. They
//! are returned by the [`crate::transport`] layer for callers that drive a
//! transport directly.

use riemann_protocol::ProtocolError;
use thiserror::Error;

/// Failure to establish a transport.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("cannot resolve {host}:{port}: {reason}")]
    Resolve {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connect timeout")]
    Timeout,

    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    #[error("TLS handshake failed: {0}")]
    TlsHandshake(String),
}

/// Failure on an established transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("short read: expected {expected} bytes, got {received}")]
    ShortRead { expected: usize, received: usize },

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: u64, max: u64 },

    #[error("request timeout")]
    Timeout,
}

impl From<ProtocolError> for TransportError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::FrameTooLarge { size, max } => TransportError::FrameTooLarge { size, max },
            other => TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                other.to_string(),
            )),
        }
    }
}
