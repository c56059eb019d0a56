//! Error types for file materialization.

use std::path::PathBuf;

use thiserror::Error;

use crate::fetch::FetchError;

/// Errors that can occur while writing a file into the local tree.
#[derive(Debug, Error)]
pub enum SyncError {
    /// File system error (create directory, write, rename).
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file's bytes could not be fetched.
    #[error("failed to download {url}: {source}")]
    Fetch {
        /// The file URL.
        url: String,
        /// The underlying fetch error.
        #[source]
        source: FetchError,
    },
}

impl SyncError {
    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a fetch error.
    pub fn fetch(url: impl Into<String>, source: FetchError) -> Self {
        Self::Fetch {
            url: url.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_error_io_display_includes_path() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let error = SyncError::io(PathBuf::from("/tmp/WS23/Algo"), io_error);
        let msg = error.to_string();
        assert!(msg.contains("/tmp/WS23/Algo"), "Expected path in: {msg}");
        assert!(msg.contains("access denied"), "Expected cause in: {msg}");
    }
}
