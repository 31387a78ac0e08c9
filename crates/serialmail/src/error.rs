//! Error types for record conversion.

use thiserror::Error;

/// Errors that can occur while building records or converting them.
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was empty, missing or out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Address, media type or disposition text is malformed.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// The code page does not name an available encoding.
    #[error("Invalid encoding: code page {0} is not available")]
    InvalidEncoding(i32),

    /// The object was used after being disposed.
    #[error("Object disposed: {0}")]
    ObjectDisposed(&'static str),

    /// I/O error while capturing attachment content.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    /// Creates an invalid argument error.
    #[must_use]
    pub fn argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<serialmail_mime::Error> for Error {
    fn from(err: serialmail_mime::Error) -> Self {
        use serialmail_mime::Error as Mime;
        match err {
            Mime::InvalidArgument(message) => Self::InvalidArgument(message),
            Mime::InvalidFormat(message) => Self::InvalidFormat(message),
            Mime::UnknownCodePage(code_page) => Self::InvalidEncoding(code_page),
            Mime::UnknownCharset(charset) => {
                Self::InvalidFormat(format!("Unknown charset: {charset}"))
            }
            Mime::Io(err) => Self::Io(err),
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
