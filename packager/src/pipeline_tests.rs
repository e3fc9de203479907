//! Unit tests for release pipeline orchestration.
//!
//! The HTTP side is mocked; archives written by the mock are real zip
//! files so the repackaging phase runs against the filesystem.

use super::*;
use crate::artefact::client::{DownloadError, MockArtifactApi};
use crate::artefact::extraction::{MockArchiveExtractor, ZipExtractor};
use crate::artefact::listing::ListingError;
use crate::catalogue::{PlatformGroup, RepoSlug};
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

const VERSION: ReleaseVersion = ReleaseVersion::new(2, 1, 0);

struct Harness {
    _temp: TempDir,
    work_dir: Utf8PathBuf,
    token_path: Utf8PathBuf,
    catalogue: ArtifactCatalogue,
}

impl Harness {
    fn request(&self, dry_run: bool) -> ReleaseRequest<'_> {
        ReleaseRequest {
            catalogue: &self.catalogue,
            version: VERSION,
            work_dir: &self.work_dir,
            token_path: Some(&self.token_path),
            scratch_root: None,
            dry_run,
        }
    }
}

#[fixture]
fn harness() -> Harness {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    let token_path = root.join("github-token");
    std::fs::write(&token_path, "secret\n").expect("write token");
    let catalogue = ArtifactCatalogue::from_groups(
        RepoSlug::try_from("owner/repo").expect("valid slug"),
        "bliss-analyser",
        [
            (PlatformGroup::LinuxX86, vec!["lin"]),
            (PlatformGroup::Windows, vec!["win"]),
        ],
    )
    .expect("valid catalogue");
    Harness {
        _temp: temp,
        work_dir: root,
        token_path,
        catalogue,
    }
}

fn listing(names: &[&str]) -> String {
    let elements = names
        .iter()
        .map(|name| {
            format!(
                r#"{{"name":"{name}","created_at":"2025-02-01T00:00:00Z","archive_download_url":"https://api.example/{name}"}}"#
            )
        })
        .collect::<Vec<_>>();
    format!(r#"{{"artifacts":[{}]}}"#, elements.join(","))
}

fn write_release_zip(dest: &Path) -> std::result::Result<u64, DownloadError> {
    let file = std::fs::File::create(dest)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().unix_permissions(0o644);
    writer
        .start_file("bliss-analyser", options)
        .map_err(|e| DownloadError::Io(std::io::Error::other(e)))?;
    writer.write_all(b"elf")?;
    writer
        .finish()
        .map_err(|e| DownloadError::Io(std::io::Error::other(e)))?;
    Ok(3)
}

fn run(
    harness: &Harness,
    dry_run: bool,
    api: &MockArtifactApi,
    extractor: &dyn ArchiveExtractor,
) -> (Result<ReleaseSummary>, String) {
    let mut out = Vec::new();
    let result = run_release(
        &harness.request(dry_run),
        api,
        extractor,
        &mut Reporter::new(&mut out, false),
    );
    (result, String::from_utf8(out).expect("UTF-8"))
}

#[rstest]
fn full_run_downloads_all_and_repackages_unix(harness: Harness) {
    let mut api = MockArtifactApi::new();
    api.expect_list_artifacts()
        .withf(|repo| repo.as_str() == "owner/repo")
        .times(1)
        .returning(|_| Ok(listing(&["lin", "win", "unrelated"])));
    api.expect_download_archive()
        .times(2)
        .returning(|_url, _token, dest| write_release_zip(dest));

    let (result, output) = run(&harness, false, &api, &ZipExtractor);
    let summary = result.expect("release succeeds");

    assert_eq!(summary.selection.len(), 2);
    assert!(summary.download.is_complete());
    assert_eq!(summary.download.downloaded.len(), 2);
    assert_eq!(summary.repackaged.len(), 1);
    assert_eq!(summary.repackaged[0].name.as_str(), "lin");
    assert!(harness.work_dir.join("lin-2.1.0.zip").exists());
    assert!(harness.work_dir.join("win-2.1.0.zip").exists());

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(
        lines,
        vec![
            "INFO: Getting artifact list",
            "INFO: Downloading lin",
            "INFO: Downloading win",
            "INFO: Making bliss-analyser executable in lin-2.1.0.zip",
        ]
    );
}

#[rstest]
fn incomplete_listing_downloads_nothing(harness: Harness) {
    // Removing the token proves it is never read.
    std::fs::remove_file(&harness.token_path).expect("remove token");

    let mut api = MockArtifactApi::new();
    api.expect_list_artifacts()
        .times(1)
        .returning(|_| Ok(listing(&["lin"])));
    api.expect_download_archive().never();

    let (result, _output) = run(&harness, false, &api, &MockArchiveExtractor::new());

    match result {
        Err(PackagerError::Listing(ListingError::Incomplete { missing })) => {
            assert_eq!(missing.len(), 1);
            assert_eq!(missing[0].as_str(), "win");
        }
        other => panic!("expected Incomplete, got {other:?}"),
    }
}

#[rstest]
fn listing_without_artifacts_is_fatal(harness: Harness) {
    let mut api = MockArtifactApi::new();
    api.expect_list_artifacts()
        .times(1)
        .returning(|_| Ok(r#"{"message":"Not Found"}"#.to_owned()));
    api.expect_download_archive().never();

    let (result, _output) = run(&harness, false, &api, &MockArchiveExtractor::new());
    assert!(matches!(
        result,
        Err(PackagerError::Listing(ListingError::MissingArtifacts))
    ));
}

#[rstest]
fn listing_request_failure_is_fatal(harness: Harness) {
    let mut api = MockArtifactApi::new();
    api.expect_list_artifacts().times(1).returning(|_| {
        Err(DownloadError::HttpError {
            url: "https://api.example".to_owned(),
            reason: "connection refused".to_owned(),
        })
    });

    let (result, _output) = run(&harness, false, &api, &MockArchiveExtractor::new());
    assert!(matches!(result, Err(PackagerError::Download(_))));
}

#[rstest]
fn dry_run_prints_selection_and_writes_nothing(harness: Harness) {
    std::fs::remove_file(&harness.token_path).expect("remove token");

    let mut api = MockArtifactApi::new();
    api.expect_list_artifacts()
        .times(1)
        .returning(|_| Ok(listing(&["lin", "win"])));
    api.expect_download_archive().never();

    let (result, output) = run(&harness, true, &api, &MockArchiveExtractor::new());
    let summary = result.expect("dry run succeeds");

    assert_eq!(summary.selection.len(), 2);
    assert!(summary.download.downloaded.is_empty());
    assert!(summary.repackaged.is_empty());
    assert!(output.contains("lin\t2025-02-01T00:00:00Z\thttps://api.example/lin"));
    assert!(!harness.work_dir.join("lin-2.1.0.zip").exists());
}

#[rstest]
fn missing_token_is_reported(harness: Harness) {
    std::fs::remove_file(&harness.token_path).expect("remove token");

    let mut api = MockArtifactApi::new();
    api.expect_list_artifacts()
        .times(1)
        .returning(|_| Ok(listing(&["lin", "win"])));
    api.expect_download_archive().never();

    let (result, _output) = run(&harness, false, &api, &MockArchiveExtractor::new());
    assert!(matches!(result, Err(PackagerError::TokenUnavailable { .. })));
}

#[rstest]
fn unknown_home_is_reported_after_listing(harness: Harness) {
    let mut api = MockArtifactApi::new();
    api.expect_list_artifacts()
        .times(1)
        .returning(|_| Ok(listing(&["lin", "win"])));

    let request = ReleaseRequest {
        token_path: None,
        ..harness.request(false)
    };
    let mut out = Vec::new();
    let result = run_release(
        &request,
        &api,
        &MockArchiveExtractor::new(),
        &mut Reporter::new(&mut out, false),
    );
    assert!(matches!(result, Err(PackagerError::HomeDirectoryUnavailable)));
}

#[rstest]
fn halted_unix_download_fails_repackaging(harness: Harness) {
    let mut api = MockArtifactApi::new();
    api.expect_list_artifacts()
        .times(1)
        .returning(|_| Ok(listing(&["lin", "win"])));
    // Claims success but leaves no file behind.
    api.expect_download_archive()
        .times(1)
        .returning(|_url, _token, _dest| Ok(0));

    let (result, output) = run(&harness, false, &api, &ZipExtractor);

    assert!(output.contains("INFO: Failed to download lin"));
    assert!(!output.contains("Downloading win"));
    assert!(matches!(result, Err(PackagerError::ArchiveMissing { .. })));
}
