//! Error types for the strm module.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// ENOSPC on Linux and macOS.
const ENOSPC: i32 = 28;

/// Errors that can occur while writing or removing `.strm` files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Permission denied.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// The filesystem is full.
    #[error("Insufficient disk space at {path}")]
    InsufficientSpace { path: PathBuf },

    /// Failed to create destination directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The path is not a library-relative `.strm` path.
    #[error("Invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: String },

    /// The URL cannot be stored as a single-line file.
    #[error("Invalid content: {0}")]
    InvalidContent(String),

    /// Any other I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WriteError {
    /// Classify an I/O error raised while touching `path`.
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        let path = path.to_path_buf();
        if error.kind() == std::io::ErrorKind::PermissionDenied {
            Self::PermissionDenied { path }
        } else if error.kind() == std::io::ErrorKind::StorageFull
            || error.raw_os_error() == Some(ENOSPC)
        {
            Self::InsufficientSpace { path }
        } else {
            Self::Io {
                path,
                source: error,
            }
        }
    }

    pub fn invalid_path(path: &Path, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
