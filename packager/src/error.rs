//! Error types for the release packager.
//!
//! Each stage of the pipeline has its own error enum; they fold into
//! [`PackagerError`], which is what the binary reports before exiting.

use crate::artefact::client::DownloadError;
use crate::artefact::extraction::ExtractionError;
use crate::artefact::listing::ListingError;
use crate::artefact::packaging_error::PackagingError;
use crate::catalogue::ArtifactName;
use crate::config::ConfigError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that abort a packaging run.
#[derive(Debug, Error)]
pub enum PackagerError {
    /// The configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The artifact list could not be obtained or is incomplete.
    #[error(transparent)]
    Listing(#[from] ListingError),

    /// An HTTP request or download write failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// The bearer token file could not be used.
    #[error("cannot read token from {path}: {reason}")]
    TokenUnavailable {
        /// Path of the token file.
        path: Utf8PathBuf,
        /// Description of the failure.
        reason: String,
    },

    /// No home directory is available to locate the default token file.
    #[error("cannot locate home directory for the default token file; pass --token-file")]
    HomeDirectoryUnavailable,

    /// A downloaded archive expected for repackaging is absent.
    #[error("archive for {artifact} not found at {path}")]
    ArchiveMissing {
        /// The artifact being repackaged.
        artifact: ArtifactName,
        /// Where the archive was expected.
        path: Utf8PathBuf,
    },

    /// Extracting an archive for repackaging failed.
    #[error("failed to extract {artifact}: {source}")]
    Extraction {
        /// The artifact being repackaged.
        artifact: ArtifactName,
        /// The underlying extraction error.
        #[source]
        source: ExtractionError,
    },

    /// Writing the repackaged archive failed.
    #[error("failed to repackage {artifact}: {source}")]
    Packaging {
        /// The artifact being repackaged.
        artifact: ArtifactName,
        /// The underlying packaging error.
        #[source]
        source: PackagingError,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write progress output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`PackagerError`].
pub type Result<T> = std::result::Result<T, PackagerError>;
