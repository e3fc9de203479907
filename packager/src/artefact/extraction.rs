//! Archive extraction for downloaded artifacts.
//!
//! Extracts `.zip` archives into a scratch directory, restoring the Unix
//! modes recorded in the archive and refusing entries that would escape
//! the destination (zip-slip).

use std::io;
use std::path::{Path, PathBuf};

/// Trait for extracting artifact archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use bliss_packager::artefact::extraction::ZipExtractor;
///
/// let extractor = ZipExtractor;
/// // Use extractor.extract(archive_path, dest_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the relative paths of the files that were extracted.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
    /// escape the destination directory, [`ExtractionError::Zip`] if the
    /// archive is unreadable, and [`ExtractionError::Io`] on I/O failures.
    fn extract(&self, archive_path: &Path, dest_dir: &Path)
    -> Result<Vec<PathBuf>, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error during extraction.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive is not a readable zip file.
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },
}

/// Default extractor using the `zip` crate.
pub struct ZipExtractor;

impl ArchiveExtractor for ZipExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExtractionError> {
        let file = std::fs::File::open(archive_path)?;
        let mut archive = zip::ZipArchive::new(file)?;
        let mut extracted = Vec::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let Some(entry_path) = entry.enclosed_name() else {
                return Err(ExtractionError::PathTraversal {
                    path: entry.name().to_owned(),
                });
            };

            let dest_path = dest_dir.join(&entry_path);
            if entry.is_dir() {
                std::fs::create_dir_all(&dest_path)?;
                continue;
            }
            if let Some(parent) = dest_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let mut out = std::fs::File::create(&dest_path)?;
            io::copy(&mut entry, &mut out)?;
            restore_mode(&dest_path, entry.unix_mode())?;
            log::trace!("extracted {}", entry_path.display());
            extracted.push(entry_path);
        }

        Ok(extracted)
    }
}

#[cfg(unix)]
fn restore_mode(path: &Path, mode: Option<u32>) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    if let Some(mode) = mode {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode & 0o7777))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn restore_mode(_path: &Path, _mode: Option<u32>) -> io::Result<()> {
    Ok(())
}
