//! Fetching, unpacking, and rebuilding workflow artifacts.
//!
//! # Sub-modules
//!
//! - [`client`] - GitHub API access trait and HTTP implementation.
//! - [`listing`] - Selecting the newest record per artifact name.
//! - [`download`] - Writing the selected archives to the work directory.
//! - [`extraction`] - Archive extraction with path traversal protection.
//! - [`permissions`] - Adding execute bits to extracted files.
//! - [`packaging`] - Rebuilding a `.zip` from an extracted tree.
//! - [`packaging_error`] - Error types for rebuilding archives.

pub mod client;
pub mod download;
pub mod extraction;
pub mod listing;
pub mod packaging;
pub mod packaging_error;
pub mod permissions;
