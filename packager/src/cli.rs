//! CLI argument definitions for the release packager.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::version::ReleaseVersion;
use camino::Utf8PathBuf;
use clap::Parser;

/// Package bliss-analyser CI builds for a release.
#[derive(Parser, Debug, Clone)]
#[command(name = "bliss-packager")]
#[command(version, about)]
#[command(long_about = concat!(
    "Package bliss-analyser CI builds for a release.\n\n",
    "Lists the GitHub Actions artifacts of the upstream repository, picks the ",
    "newest build of every catalogue artifact, and downloads each one as ",
    "<artifact>-<VERSION>.zip. Linux and macOS archives are then rebuilt so ",
    "the analyser binary (and everything under bin/) is executable.\n\n",
    "The download token is read from ~/.config/github-token unless ",
    "--token-file or the config file names another location.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Package release 0.3.0 into the current directory:\n",
    "    $ bliss-packager 0.3.0\n\n",
    "  Check which builds would be used:\n",
    "    $ bliss-packager --dry-run test\n\n",
    "  Use a forked repository and another output directory:\n",
    "    $ bliss-packager -c fork.toml -C dist 0.3.0",
))]
pub struct Cli {
    /// Release version (`<major>.<minor>.<patch>`) or `test`.
    #[arg(id = "release_version", value_name = "VERSION")]
    pub version: ReleaseVersion,

    /// TOML configuration file overriding the built-in catalogue.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<Utf8PathBuf>,

    /// File holding the download token [default: ~/.config/github-token].
    #[arg(long, value_name = "FILE")]
    pub token_file: Option<Utf8PathBuf>,

    /// Directory receiving the archives [default: current directory].
    #[arg(short = 'C', long, value_name = "DIR")]
    pub work_dir: Option<Utf8PathBuf>,

    /// List and verify the artifacts without downloading anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Suppress progress output (errors still shown).
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
