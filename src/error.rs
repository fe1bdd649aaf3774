//! Centralized error types for mimeparse.
//!
//! Parsing itself never fails: malformed input degrades to empty headers or
//! zero parts. Only the I/O surrounding the engine (loading a message from
//! disk, writing attachments) can produce an error.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mimeparse library.
#[derive(Error, Debug)]
pub enum MimeError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified message file does not exist.
    #[error("Message file not found: {0}")]
    FileNotFound(PathBuf),

    /// An invalid path was provided.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Convenience alias for `Result<T, MimeError>`.
pub type Result<T> = std::result::Result<T, MimeError>;

impl MimeError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Classify a read failure: missing files get their own variant.
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound(path)
        } else {
            Self::io(path, source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_not_found_maps_to_file_not_found() {
        let err = MimeError::read(
            "/nope.eml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, MimeError::FileNotFound(p) if p == PathBuf::from("/nope.eml")));
    }

    #[test]
    fn test_read_other_maps_to_io() {
        let err = MimeError::read(
            "/locked.eml",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, MimeError::Io { .. }));
        assert!(err.to_string().contains("/locked.eml"));
    }
}
