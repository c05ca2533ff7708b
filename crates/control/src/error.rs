//! Control-layer errors.

use rangelink_codec::CodecError;
use rangelink_link::LinkError;
use thiserror::Error;

/// Errors surfaced by the command facade and the upload engine.
#[derive(Error, Debug)]
pub enum ControlError {
    /// The link layer failed or the reply window expired.
    #[error("link error: {0}")]
    Link(#[from] LinkError),

    /// A frame could not be built or a reply could not be decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The upload retry budget ran out before the final chunk.
    #[error("upload aborted at chunk {chunk} of {total}: {retries} retries consumed")]
    RetryBudgetExhausted {
        /// Index of the chunk being retried when the budget ran out
        chunk: usize,
        /// Total chunks in the session
        total: usize,
        /// Retries consumed, equal to the budget
        retries: u32,
    },

    /// All chunks went out but the session ended with retries outstanding.
    #[error("upload finished with {retries} retries outstanding")]
    UploadIncomplete {
        /// Retries outstanding at termination
        retries: u32,
    },

    /// Another bulk transfer already holds the channel.
    #[error("channel already held by another transfer")]
    ChannelBusy,

    /// A route failed validation before chunking.
    #[error("invalid route: {0}")]
    InvalidRoute(String),
}

/// Result alias for control operations.
pub type ControlResult<T> = Result<T, ControlError>;
