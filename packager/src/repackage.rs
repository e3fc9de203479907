//! Restoring execute permissions inside downloaded Unix archives.
//!
//! CI artifact downloads lose the execute bit on the analyser binary. Each
//! Unix archive is unpacked into a scratch directory, the executable (and
//! everything directly under `bin/`) gets `a+x`, and the archive is
//! rebuilt in place under the same name.

use crate::artefact::download::archive_path;
use crate::artefact::extraction::ArchiveExtractor;
use crate::artefact::packaging::create_zip_from_dir;
use crate::artefact::permissions::{mark_directory_entries_executable, mark_executable};
use crate::catalogue::ArtifactName;
use crate::error::{PackagerError, Result};
use crate::output::Reporter;
use crate::version::ReleaseVersion;
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Inputs for [`repackage_unix_artifacts`].
#[derive(Debug)]
pub struct RepackageRequest<'a> {
    /// Unix artifacts to rewrite, in the order they are processed.
    pub artifacts: &'a [ArtifactName],
    /// File at the archive root that must become executable.
    pub executable: &'a str,
    /// Version used to locate the archives.
    pub version: ReleaseVersion,
    /// Directory holding the downloaded archives.
    pub work_dir: &'a Utf8Path,
    /// Parent for scratch directories; the system temp dir when `None`.
    pub scratch_root: Option<&'a Utf8Path>,
}

/// One archive rewritten with execute permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepackagedArchive {
    /// The artifact name.
    pub name: ArtifactName,
    /// Where the rebuilt archive was written.
    pub archive_path: Utf8PathBuf,
    /// Whether the executable was found at the archive root.
    pub executable_marked: bool,
    /// Number of `bin/` entries marked executable.
    pub bin_entries_marked: usize,
}

/// Rewrite every archive in `request.artifacts` with execute bits set.
///
/// Stops at the first failure; archives already rewritten stay on disk.
///
/// # Errors
///
/// Returns [`PackagerError::ArchiveMissing`] if an archive is absent,
/// [`PackagerError::Extraction`] or [`PackagerError::Packaging`] if it
/// cannot be unpacked or rebuilt, and [`PackagerError::Io`] for other
/// filesystem failures.
pub fn repackage_unix_artifacts(
    request: &RepackageRequest<'_>,
    extractor: &dyn ArchiveExtractor,
    reporter: &mut Reporter<'_>,
) -> Result<Vec<RepackagedArchive>> {
    let mut repackaged = Vec::with_capacity(request.artifacts.len());
    for name in request.artifacts {
        repackaged.push(repackage_one(request, name, extractor, reporter)?);
    }
    Ok(repackaged)
}

fn repackage_one(
    request: &RepackageRequest<'_>,
    name: &ArtifactName,
    extractor: &dyn ArchiveExtractor,
    reporter: &mut Reporter<'_>,
) -> Result<RepackagedArchive> {
    let archive = archive_path(request.work_dir, name, request.version);
    reporter.info(format!(
        "Making {} executable in {}",
        request.executable,
        archive.file_name().unwrap_or(archive.as_str())
    ));
    if !archive.is_file() {
        return Err(PackagerError::ArchiveMissing {
            artifact: name.clone(),
            path: archive,
        });
    }

    // Dropped at the end of this call, removing the extracted tree.
    let scratch = scratch_dir(request.scratch_root)?;
    log::debug!("extracting {archive} into {}", scratch.path().display());
    extractor
        .extract(archive.as_std_path(), scratch.path())
        .map_err(|source| PackagerError::Extraction {
            artifact: name.clone(),
            source,
        })?;
    std::fs::remove_file(&archive)?;

    let executable_marked = mark_executable(&scratch.path().join(request.executable))?;
    let bin_entries_marked = mark_directory_entries_executable(&scratch.path().join("bin"))?;
    if !executable_marked {
        log::debug!("{} has no {} at its root", name, request.executable);
    }

    let files = create_zip_from_dir(scratch.path(), archive.as_std_path()).map_err(|source| {
        PackagerError::Packaging {
            artifact: name.clone(),
            source,
        }
    })?;
    log::debug!("rebuilt {archive} with {files} file(s)");

    Ok(RepackagedArchive {
        name: name.clone(),
        archive_path: archive,
        executable_marked,
        bin_entries_marked,
    })
}

fn scratch_dir(root: Option<&Utf8Path>) -> std::io::Result<TempDir> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("bliss-packager-");
    root.map_or_else(|| builder.tempdir(), |root| builder.tempdir_in(root))
}

#[cfg(test)]
#[path = "repackage_tests.rs"]
mod tests;
