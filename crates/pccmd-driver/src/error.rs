//! Error types for the session driver

use std::time::Duration;

use thiserror::Error;

use pccmd_protocol::FrameError;

/// Errors that abort a wait on the serial link.
///
/// Negative acknowledgements are not errors — they are terminal outcomes
/// reported through [`crate::session::SendOutcome`].
#[derive(Debug, Error)]
pub enum LinkError {
    /// No frame terminator arrived before the deadline
    #[error("no complete frame within {0:?}")]
    Timeout(Duration),

    /// Framing succeeded but the payload failed to decode
    #[error(transparent)]
    Decode(#[from] FrameError),

    /// A prefix-matched reply carried fields that failed to parse
    #[error("malformed reply: {0}")]
    MalformedReply(String),

    /// The underlying byte stream failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
