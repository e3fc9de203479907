//! Unit tests for archive repackaging.

use super::*;
use crate::artefact::extraction::{ExtractionError, MockArchiveExtractor, ZipExtractor};
use rstest::{fixture, rstest};
use std::io::{Read, Write};
use zip::write::SimpleFileOptions;

const VERSION: ReleaseVersion = ReleaseVersion::new(2, 1, 0);
const EXECUTABLE: &str = "bliss-analyser";

struct Workspace {
    _temp: TempDir,
    work_dir: Utf8PathBuf,
    scratch_root: Utf8PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let temp = tempfile::tempdir().expect("temp dir");
    let root = Utf8PathBuf::try_from(temp.path().to_path_buf()).expect("UTF-8 path");
    let work_dir = root.join("work");
    let scratch_root = root.join("scratch");
    std::fs::create_dir(&work_dir).expect("create work dir");
    std::fs::create_dir(&scratch_root).expect("create scratch root");
    Workspace {
        _temp: temp,
        work_dir,
        scratch_root,
    }
}

fn name(value: &str) -> ArtifactName {
    ArtifactName::try_from(value).expect("valid name")
}

fn write_archive(path: &Utf8Path, entries: &[(&str, &str)]) {
    let file = std::fs::File::create(path).expect("create archive");
    let mut writer = zip::ZipWriter::new(file);
    for (entry, contents) in entries {
        let options = SimpleFileOptions::default().unix_permissions(0o644);
        writer.start_file(*entry, options).expect("start file");
        writer.write_all(contents.as_bytes()).expect("write entry");
    }
    writer.finish().expect("finish archive");
}

fn entry_mode(path: &Utf8Path, entry: &str) -> u32 {
    let file = std::fs::File::open(path).expect("open archive");
    let mut archive = zip::ZipArchive::new(file).expect("read archive");
    let mode = archive
        .by_name(entry)
        .expect("entry present")
        .unix_mode()
        .expect("mode recorded");
    mode & 0o777
}

fn scratch_is_empty(workspace: &Workspace) -> bool {
    std::fs::read_dir(&workspace.scratch_root)
        .expect("list scratch root")
        .next()
        .is_none()
}

fn run(
    workspace: &Workspace,
    artifacts: &[ArtifactName],
    extractor: &dyn ArchiveExtractor,
) -> (Result<Vec<RepackagedArchive>>, String) {
    let request = RepackageRequest {
        artifacts,
        executable: EXECUTABLE,
        version: VERSION,
        work_dir: &workspace.work_dir,
        scratch_root: Some(&workspace.scratch_root),
    };
    let mut out = Vec::new();
    let result = repackage_unix_artifacts(&request, extractor, &mut Reporter::new(&mut out, false));
    (result, String::from_utf8(out).expect("UTF-8"))
}

#[rstest]
fn marks_executable_and_bin_entries(workspace: Workspace) {
    let archive = workspace.work_dir.join("linux-2.1.0.zip");
    write_archive(
        &archive,
        &[
            (EXECUTABLE, "elf"),
            ("bin/ffmpeg", "elf"),
            ("bin/ffprobe", "elf"),
            ("README.md", "docs"),
        ],
    );

    let (result, output) = run(&workspace, &[name("linux")], &ZipExtractor);
    let repackaged = result.expect("repackaging succeeds");

    assert_eq!(
        repackaged,
        vec![RepackagedArchive {
            name: name("linux"),
            archive_path: archive.clone(),
            executable_marked: cfg!(unix),
            bin_entries_marked: if cfg!(unix) { 2 } else { 0 },
        }]
    );
    assert!(output.contains("INFO: Making bliss-analyser executable in linux-2.1.0.zip"));
    if cfg!(unix) {
        assert_eq!(entry_mode(&archive, EXECUTABLE), 0o755);
        assert_eq!(entry_mode(&archive, "bin/ffmpeg"), 0o755);
        assert_eq!(entry_mode(&archive, "README.md"), 0o644);
    }
}

#[rstest]
fn rebuilt_archive_keeps_contents(workspace: Workspace) {
    let archive = workspace.work_dir.join("mac-2.1.0.zip");
    write_archive(&archive, &[(EXECUTABLE, "analyser body")]);

    let (result, _output) = run(&workspace, &[name("mac")], &ZipExtractor);
    result.expect("repackaging succeeds");

    let file = std::fs::File::open(&archive).expect("open archive");
    let mut zip = zip::ZipArchive::new(file).expect("read archive");
    let mut contents = String::new();
    zip.by_name(EXECUTABLE)
        .expect("entry present")
        .read_to_string(&mut contents)
        .expect("read entry");
    assert_eq!(contents, "analyser body");
}

#[rstest]
fn missing_executable_is_recorded_not_fatal(workspace: Workspace) {
    let archive = workspace.work_dir.join("odd-2.1.0.zip");
    write_archive(&archive, &[("nested/bliss-analyser", "elf")]);

    let (result, _output) = run(&workspace, &[name("odd")], &ZipExtractor);
    let repackaged = result.expect("repackaging succeeds");

    assert!(!repackaged[0].executable_marked);
    assert!(archive.exists());
    assert!(scratch_is_empty(&workspace));
}

#[rstest]
fn scratch_directory_is_removed_after_success(workspace: Workspace) {
    write_archive(
        &workspace.work_dir.join("a-2.1.0.zip"),
        &[(EXECUTABLE, "elf")],
    );
    write_archive(
        &workspace.work_dir.join("b-2.1.0.zip"),
        &[(EXECUTABLE, "elf")],
    );

    let (result, _output) = run(&workspace, &[name("a"), name("b")], &ZipExtractor);
    assert_eq!(result.expect("repackaging succeeds").len(), 2);
    assert!(scratch_is_empty(&workspace));
}

#[rstest]
fn missing_archive_is_an_error(workspace: Workspace) {
    let (result, output) = run(&workspace, &[name("absent")], &ZipExtractor);

    match result {
        Err(PackagerError::ArchiveMissing { artifact, path }) => {
            assert_eq!(artifact, name("absent"));
            assert_eq!(path, workspace.work_dir.join("absent-2.1.0.zip"));
        }
        other => panic!("expected ArchiveMissing, got {other:?}"),
    }
    assert!(output.contains("absent-2.1.0.zip"));
}

#[rstest]
fn extraction_failure_keeps_archive_and_cleans_scratch(workspace: Workspace) {
    let archive = workspace.work_dir.join("broken-2.1.0.zip");
    std::fs::write(&archive, b"not a zip").expect("write archive");

    let mut extractor = MockArchiveExtractor::new();
    extractor
        .expect_extract()
        .times(1)
        .returning(|_archive, _dest| {
            Err(ExtractionError::PathTraversal {
                path: "../escape".to_owned(),
            })
        });

    let (result, _output) = run(&workspace, &[name("broken")], &extractor);

    assert!(matches!(result, Err(PackagerError::Extraction { .. })));
    assert!(archive.exists());
    assert!(scratch_is_empty(&workspace));
}

#[rstest]
fn stops_at_first_failure(workspace: Workspace) {
    write_archive(
        &workspace.work_dir.join("first-2.1.0.zip"),
        &[(EXECUTABLE, "elf")],
    );

    let (result, output) = run(
        &workspace,
        &[name("first"), name("second"), name("third")],
        &ZipExtractor,
    );

    assert!(matches!(result, Err(PackagerError::ArchiveMissing { .. })));
    assert!(!output.contains("third"));
}
