//! bliss-packager CLI entrypoint.
//!
//! Downloads the newest CI build of every bliss-analyser artifact for a
//! release and restores execute permissions inside the Unix archives.

use bliss_packager::artefact::client::HttpClient;
use bliss_packager::artefact::extraction::ZipExtractor;
use bliss_packager::catalogue::ArtifactCatalogue;
use bliss_packager::cli::Cli;
use bliss_packager::config::PackagerConfig;
use bliss_packager::error::Result;
use bliss_packager::output::{Reporter, success_message, write_error};
use bliss_packager::pipeline::{ReleaseRequest, run_release};
use bliss_packager::token::default_token_path;
use camino::Utf8PathBuf;
use clap::Parser;
use std::io::Write;

/// Settings merged from the CLI, the config file, and built-in defaults.
#[derive(Debug)]
struct Settings {
    catalogue: ArtifactCatalogue,
    work_dir: Utf8PathBuf,
    token_path: Option<Utf8PathBuf>,
    scratch_root: Option<Utf8PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let run_result = run(&cli, &mut stdout);
    let exit_code = exit_code_for_run_result(run_result, &mut stdout);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write) -> Result<()> {
    let config = cli
        .config
        .as_deref()
        .map(PackagerConfig::load)
        .transpose()?
        .unwrap_or_default();
    let settings = resolve_settings(cli, config, default_token_path())?;

    let request = ReleaseRequest {
        catalogue: &settings.catalogue,
        version: cli.version,
        work_dir: &settings.work_dir,
        token_path: settings.token_path.as_deref(),
        scratch_root: settings.scratch_root.as_deref(),
        dry_run: cli.dry_run,
    };
    let mut reporter = Reporter::new(stdout, cli.quiet);
    let summary = run_release(&request, &HttpClient::default(), &ZipExtractor, &mut reporter)?;

    if !cli.dry_run {
        reporter.info(success_message(
            summary.download.downloaded.len(),
            &summary.repackaged,
        ));
    }
    Ok(())
}

/// Apply precedence: CLI flags, then the config file, then defaults.
fn resolve_settings(
    cli: &Cli,
    config: PackagerConfig,
    default_token: Option<Utf8PathBuf>,
) -> Result<Settings> {
    let catalogue = config.catalogue()?;
    let token_path = cli
        .token_file
        .clone()
        .or(config.token_file)
        .or(default_token);
    let work_dir = cli
        .work_dir
        .clone()
        .unwrap_or_else(|| Utf8PathBuf::from("."));

    Ok(Settings {
        catalogue,
        work_dir,
        token_path,
        scratch_root: config.scratch_dir,
    })
}

fn exit_code_for_run_result(result: Result<()>, stdout: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_error(stdout, &err);
            1
        }
    }
}
