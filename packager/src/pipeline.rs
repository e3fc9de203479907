//! Release pipeline orchestration.
//!
//! Runs the three phases in order: list the CI artifacts and check that
//! every catalogue name has a build, download the archives, then rewrite
//! the Unix archives with execute permissions. A dry run stops after the
//! listing and prints the selection instead.

use crate::artefact::client::ArtifactApi;
use crate::artefact::download::{DownloadReport, DownloadRequest, download_artifacts};
use crate::artefact::extraction::ArchiveExtractor;
use crate::artefact::listing::{ArtifactRecords, ensure_complete, select_latest};
use crate::catalogue::ArtifactCatalogue;
use crate::error::{PackagerError, Result};
use crate::output::{Reporter, format_selection};
use crate::repackage::{RepackageRequest, RepackagedArchive, repackage_unix_artifacts};
use crate::token::read_token;
use crate::version::ReleaseVersion;
use camino::Utf8Path;

/// Everything a release run needs to know.
#[derive(Debug)]
pub struct ReleaseRequest<'a> {
    /// Artifacts to fetch and where they come from.
    pub catalogue: &'a ArtifactCatalogue,
    /// Version used to name the archives.
    pub version: ReleaseVersion,
    /// Directory receiving the archives.
    pub work_dir: &'a Utf8Path,
    /// Token file; `None` when no default location could be determined.
    pub token_path: Option<&'a Utf8Path>,
    /// Parent for repackaging scratch directories.
    pub scratch_root: Option<&'a Utf8Path>,
    /// List and verify only.
    pub dry_run: bool,
}

/// What a release run did.
#[derive(Debug, Default)]
pub struct ReleaseSummary {
    /// Newest record per catalogue artifact.
    pub selection: ArtifactRecords,
    /// Download outcome; empty for a dry run.
    pub download: DownloadReport,
    /// Archives rewritten with execute permissions; empty for a dry run.
    pub repackaged: Vec<RepackagedArchive>,
}

/// Run a release.
///
/// The token is read only after the listing is known to be complete, so
/// an incomplete listing never touches the credential.
///
/// # Errors
///
/// Returns [`PackagerError::Listing`] when the listing is unusable or
/// incomplete, [`PackagerError::TokenUnavailable`] or
/// [`PackagerError::HomeDirectoryUnavailable`] when no token can be read,
/// [`PackagerError::Download`] for failed downloads, and the repackaging
/// errors of [`repackage_unix_artifacts`].
pub fn run_release(
    request: &ReleaseRequest<'_>,
    api: &dyn ArtifactApi,
    extractor: &dyn ArchiveExtractor,
    reporter: &mut Reporter<'_>,
) -> Result<ReleaseSummary> {
    let catalogue = request.catalogue;
    let allow_list = catalogue.allow_list();

    reporter.info("Getting artifact list");
    let payload = api.list_artifacts(catalogue.repository())?;
    let selection = select_latest(&payload, &allow_list)?;
    ensure_complete(&selection, &allow_list)?;
    log::debug!("selected {} artifact(s)", selection.len());

    if request.dry_run {
        reporter.emit(format_selection(&selection))?;
        return Ok(ReleaseSummary {
            selection,
            ..ReleaseSummary::default()
        });
    }

    let token_path = request
        .token_path
        .ok_or(PackagerError::HomeDirectoryUnavailable)?;
    let token = read_token(token_path)?;

    let download = download_artifacts(
        &DownloadRequest {
            records: &selection,
            order: &allow_list,
            version: request.version,
            work_dir: request.work_dir,
            token: &token,
        },
        api,
        reporter,
    )?;
    drop(token);

    let unix_artifacts = catalogue.unix_artifacts();
    let repackaged = repackage_unix_artifacts(
        &RepackageRequest {
            artifacts: &unix_artifacts,
            executable: catalogue.executable(),
            version: request.version,
            work_dir: request.work_dir,
            scratch_root: request.scratch_root,
        },
        extractor,
        reporter,
    )?;

    Ok(ReleaseSummary {
        selection,
        download,
        repackaged,
    })
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
