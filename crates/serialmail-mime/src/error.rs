//! Error types for the mail object model.

use std::io;

/// Result type alias for mail object model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Mail object model error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required argument was empty or missing.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Address, content type or disposition text is malformed.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The code page is not registered.
    #[error("Unknown code page: {0}")]
    UnknownCodePage(i32),

    /// The charset label is not registered.
    #[error("Unknown charset: {0}")]
    UnknownCharset(String),

    /// I/O error while reading attachment content.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Creates an invalid argument error.
    #[must_use]
    pub fn argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates an invalid format error.
    #[must_use]
    pub fn format(message: impl Into<String>) -> Self {
        Self::InvalidFormat(message.into())
    }
}
