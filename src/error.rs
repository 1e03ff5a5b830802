//! Error types for the log tail library.

use std::path::Path;
use thiserror::Error;

/// Boxed error raised by a caller-supplied line handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for log tail operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors when reading log files or writing state.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding errors when a line is not valid text.
    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// A log file that had to be read does not exist.
    #[error("File does not exist: {path}")]
    FileNotFound { path: String },

    /// The `.1` sibling does not start with the remembered first line.
    #[error("Rotated file could not be found: {path} does not start with the remembered first line")]
    RotationVerification { path: String },

    /// The persisted state could not be encoded or decoded.
    #[error("State serialization error: {0}")]
    State(#[from] serde_yaml::Error),

    /// File watching errors from the notify crate.
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// An error returned by the line handler, passed through untouched.
    #[error("Line handler failed: {0}")]
    Handler(#[source] HandlerError),
}

impl Error {
    pub(crate) fn file_not_found(path: &Path) -> Self {
        Error::FileNotFound {
            path: path.display().to_string(),
        }
    }

    /// Maps `NotFound` to [`Error::FileNotFound`] for the given path.
    pub(crate) fn from_open(err: std::io::Error, path: &Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::file_not_found(path)
        } else {
            Error::Io(err)
        }
    }
}

/// A convenient Result type for log tail operations.
pub type Result<T> = std::result::Result<T, Error>;
