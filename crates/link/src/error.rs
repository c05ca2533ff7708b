//! Error types for transport and link operations.

use thiserror::Error;

/// Errors that can occur at the transport boundary or in the link layer.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Serial port could not be opened or configured
    #[error("serial port error: {0}")]
    Port(#[from] serialport::Error),

    /// I/O failure while reading or writing the transport
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport failed while servicing a request from another caller
    #[error("transport failure: {0}")]
    Transport(String),

    /// No reply arrived within the allotted window
    #[error("timed out waiting for reply")]
    Timeout,

    /// Request was discarded by a flush before it could be transmitted
    #[error("request discarded before transmission")]
    Unanswered,

    /// Malformed link-layer destination address
    #[error("invalid link address: {0}")]
    InvalidAddress(String),

    /// No candidate serial port found during autodiscovery
    #[error("no USB serial port found")]
    NoPort,
}

/// Result type for link operations.
pub type LinkResult<T> = Result<T, LinkError>;
