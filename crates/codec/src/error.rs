//! Error types for frame encoding and decoding.

use thiserror::Error;

/// Errors that can occur while building or decoding frames.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Reply buffer shorter than the declared type's minimum layout
    #[error("reply too short for {command}: {len} bytes, need at least {min}")]
    Truncated {
        /// Command the buffer was decoded as
        command: &'static str,
        /// Bytes actually available
        len: usize,
        /// Minimum bytes the layout requires
        min: usize,
    },

    /// Command code not part of the closed enumeration
    #[error("unknown command code {0:#04x}")]
    UnknownCommand(u8),

    /// Upload chunk data exceeds the frame's chunk capacity
    #[error("upload chunk data too long: {0} bytes (max 12)")]
    ChunkTooLong(usize),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
