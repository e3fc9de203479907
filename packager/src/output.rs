//! Progress and error lines for the packager CLI.
//!
//! Progress is reported as `INFO: <message>` and failures as
//! `ERROR: <message>`, both on standard output. Writers are injected so
//! tests can capture what would be printed.

use crate::artefact::listing::ArtifactRecords;
use crate::error::{PackagerError, Result};
use crate::repackage::RepackagedArchive;
use std::fmt::Display;
use std::io::Write;

/// Where progress lines go and whether they are shown.
pub struct Reporter<'a> {
    out: &'a mut dyn Write,
    quiet: bool,
}

impl<'a> Reporter<'a> {
    /// Report to `out`, suppressing `INFO:` lines when `quiet` is set.
    #[must_use]
    pub const fn new(out: &'a mut dyn Write, quiet: bool) -> Self {
        Self { out, quiet }
    }

    /// Write an `INFO:` line unless quiet.
    pub fn info(&mut self, message: impl Display) {
        if !self.quiet {
            write_line(&mut *self.out, format_args!("INFO: {message}"));
        }
    }

    /// Write a line that is always shown and must reach the writer.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::WriteFailed`] if the write fails.
    pub fn emit(&mut self, message: impl Display) -> Result<()> {
        writeln!(self.out, "{message}").map_err(|source| PackagerError::WriteFailed { source })
    }
}

/// Write an `ERROR:` line for `err`.
pub fn write_error(out: &mut dyn Write, err: &dyn Display) {
    write_line(out, format_args!("ERROR: {err}"));
}

fn write_line(out: &mut dyn Write, message: std::fmt::Arguments<'_>) {
    if writeln!(out, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Format the selected artifacts for a dry run.
///
/// One line per artifact: name, creation time, and download URL.
#[must_use]
pub fn format_selection(records: &ArtifactRecords) -> String {
    records
        .iter()
        .map(|(name, record)| {
            format!(
                "{name}\t{}\t{}",
                record.created_at.format("%Y-%m-%dT%H:%M:%SZ"),
                record.download_url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a closing summary after a packaging run.
#[must_use]
pub fn success_message(downloaded: usize, repackaged: &[RepackagedArchive]) -> String {
    let plural = if downloaded == 1 { "archive" } else { "archives" };
    let missing_executables = repackaged
        .iter()
        .filter(|archive| !archive.executable_marked)
        .count();
    let mut message =
        format!("Downloaded {downloaded} {plural}, repackaged {}", repackaged.len());
    if missing_executables > 0 {
        message.push_str(&format!(
            " ({missing_executables} without an executable at the archive root)"
        ));
    }
    message
}
