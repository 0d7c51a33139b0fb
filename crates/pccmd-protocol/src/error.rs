//! Error types for PC-CMD frame decoding

use thiserror::Error;

/// Errors that can occur while decoding a raw frame
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Payload between the delimiters is not valid UTF-8
    #[error("frame payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}
