//! Error types for rebuilding artifact archives.

use thiserror::Error;

/// Errors arising while writing a directory tree back into a `.zip`.
#[derive(Debug, Error)]
pub enum PackagingError {
    /// An I/O operation failed (walking the tree, reading a file, writing the archive).
    #[error("I/O error during packaging: {0}")]
    Io(#[from] std::io::Error),

    /// The zip writer rejected an entry or failed to finish the archive.
    #[error("zip error during packaging: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A walked path could not be expressed relative to the source directory.
    #[error("path {path} is not inside {root}")]
    StripPrefix {
        /// The path found while walking.
        path: std::path::PathBuf,
        /// The directory being archived.
        root: std::path::PathBuf,
    },

    /// A path inside the tree is not valid UTF-8 and cannot name a zip entry.
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(std::path::PathBuf),
}
