//! bliss-analyser release packager library.
//!
//! This crate fetches the newest GitHub Actions build of every
//! bliss-analyser artifact and prepares the archives for publishing. It is
//! used by the `bliss-packager` CLI binary and can be driven
//! programmatically with stub HTTP clients for testing.
//!
//! # Modules
//!
//! - [`artefact`] - Listing, downloading, and rebuilding artifact archives
//! - [`catalogue`] - The artifact table and its platform groups
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Optional TOML configuration file
//! - [`error`] - Semantic error types for a packaging run
//! - [`output`] - `INFO:` and `ERROR:` line formatting
//! - [`pipeline`] - List, download, and repackage orchestration
//! - [`repackage`] - Restoring execute permissions inside Unix archives
//! - [`token`] - Bearer token loading
//! - [`version`] - Release version parsing

pub mod artefact;
pub mod catalogue;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod repackage;
pub mod token;
pub mod version;
