//! Error types for enclave-core

use std::net::SocketAddr;

use thiserror::Error;

/// Result type alias for enclave operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the enclave HTTP server
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid HTTP method
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Listen address could not be parsed
    #[error("Invalid listen address {addr}: {source}")]
    InvalidAddress {
        addr: String,
        source: std::net::AddrParseError,
    },

    /// Listener could not bind (port in use, insufficient privilege)
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
