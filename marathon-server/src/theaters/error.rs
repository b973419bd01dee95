//! Theater directory error types.

use std::path::PathBuf;

/// Errors that can occur when loading the theater directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The directory file could not be read
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the directory JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// The directory has no usable theaters
    #[error("theater directory is empty")]
    Empty,
}
