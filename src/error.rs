//! Error types for textgrove.

use std::fmt;
use std::io;

/// Result type alias for textgrove operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for textgrove operations.
///
/// Only bulk loading can fail: positions handed to edits, cursors, and
/// motions are clamped to the document, never rejected.
#[derive(Debug)]
pub enum Error {
    /// I/O error from the byte source during bulk loading.
    Io(io::Error),
    /// Malformed or truncated UTF-8 at the given byte offset.
    InvalidUtf8 { offset: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidUtf8 { offset } => {
                write!(f, "invalid UTF-8 at byte offset {offset}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::InvalidUtf8 { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
