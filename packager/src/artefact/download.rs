//! Downloading the selected artifact archives.
//!
//! Each archive is written to `<work_dir>/<name>-<version>.zip`. After a
//! write the destination is checked; if it is missing the run stops
//! downloading and reports where it halted instead of failing, leaving any
//! archives already written in place.

use super::client::{ArtifactApi, DownloadError};
use super::listing::ArtifactRecords;
use crate::catalogue::ArtifactName;
use crate::output::Reporter;
use crate::token::GithubToken;
use crate::version::ReleaseVersion;
use camino::{Utf8Path, Utf8PathBuf};

/// Inputs for [`download_artifacts`].
#[derive(Debug)]
pub struct DownloadRequest<'a> {
    /// Newest record per artifact.
    pub records: &'a ArtifactRecords,
    /// Artifacts to fetch, in the order they are fetched.
    pub order: &'a [ArtifactName],
    /// Version used to name the archives.
    pub version: ReleaseVersion,
    /// Directory receiving the archives.
    pub work_dir: &'a Utf8Path,
    /// Credential for the download URLs.
    pub token: &'a GithubToken,
}

/// One archive written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArchive {
    /// The artifact name.
    pub name: ArtifactName,
    /// Where the archive was written.
    pub path: Utf8PathBuf,
    /// Number of bytes written.
    pub bytes: u64,
}

/// Outcome of the download phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Archives written, in download order.
    pub downloaded: Vec<DownloadedArchive>,
    /// The artifact whose archive was absent after writing, if any.
    ///
    /// Artifacts after this one were not attempted.
    pub halted_at: Option<ArtifactName>,
}

impl DownloadReport {
    /// Return true when every requested archive was written.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.halted_at.is_none()
    }
}

/// Path of the archive for `name` at `version` inside `work_dir`.
#[must_use]
pub fn archive_path(work_dir: &Utf8Path, name: &ArtifactName, version: ReleaseVersion) -> Utf8PathBuf {
    work_dir.join(version.archive_file_name(name.as_str()))
}

/// Download every artifact in `request.order` that has a record.
///
/// Names without a record are skipped; completeness is checked before
/// this phase runs.
///
/// # Errors
///
/// Returns a [`DownloadError`] if a request fails or an archive cannot
/// be written. A destination that is absent after a successful write is
/// not an error: it ends the phase with
/// [`DownloadReport::halted_at`] set.
pub fn download_artifacts(
    request: &DownloadRequest<'_>,
    api: &dyn ArtifactApi,
    reporter: &mut Reporter<'_>,
) -> Result<DownloadReport, DownloadError> {
    let mut report = DownloadReport::default();

    for name in request.order {
        let Some(record) = request.records.get(name) else {
            log::debug!("no record for {name}; skipping download");
            continue;
        };
        let dest = archive_path(request.work_dir, name, request.version);
        reporter.info(format!("Downloading {name}"));
        let bytes = api.download_archive(&record.download_url, request.token, dest.as_std_path())?;

        if !dest.exists() {
            reporter.info(format!("Failed to download {name}"));
            report.halted_at = Some(name.clone());
            break;
        }

        report.downloaded.push(DownloadedArchive {
            name: name.clone(),
            path: dest,
            bytes,
        });
    }

    Ok(report)
}
