//! Error types for CloudProof core.

use std::{error::Error, fmt, io};

/// Error type for CloudProof core operations.
///
/// Normalization itself never fails; these errors only come from the edges
/// that validate caller input or touch bytes on disk.
#[derive(Debug)]
pub enum CloudProofError {
    /// An underlying I/O error.
    Io(io::Error),
    /// Input was not valid JSON text.
    Json(serde_json::Error),
    /// A heatmap window could not be constructed.
    InvalidWindow(String),
    /// A catch-all error with a message.
    Other(String),
}

impl fmt::Display for CloudProofError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::InvalidWindow(message) => write!(f, "invalid window: {message}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for CloudProofError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::InvalidWindow(_) | Self::Other(_) => None,
        }
    }
}

impl From<io::Error> for CloudProofError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CloudProofError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Convenience result type for CloudProof core.
pub type Result<T> = std::result::Result<T, CloudProofError>;
