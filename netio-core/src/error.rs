//! Error types for the NETIO client

use thiserror::Error;

/// Core error type for NETIO operations
#[derive(Error, Debug)]
pub enum NetioError {
    /// A required parameter could not be resolved, or resolved values
    /// contradict each other
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection failure, timeout, or TLS handshake failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-2xx HTTP status or a response that does not match the device
    /// JSON schema
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Requested output ID absent from the device response
    #[error("unknown output ID {0}")]
    OutputNotFound(u32),

    /// Invalid command-line argument combination
    #[error("usage error: {0}")]
    Usage(String),
}

/// Result type alias for NETIO operations
pub type Result<T> = std::result::Result<T, NetioError>;

impl From<serde_json::Error> for NetioError {
    fn from(err: serde_json::Error) -> Self {
        NetioError::Protocol(format!("invalid JSON: {err}"))
    }
}
