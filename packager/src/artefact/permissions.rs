//! Execute permission handling.
//!
//! Equivalent to `chmod a+x`: the execute bits for user, group, and other
//! are added to whatever mode the file already has. Paths that do not exist
//! are skipped without error. Hosts without Unix permissions treat every
//! call as a no-op.

use std::io;
use std::path::Path;

/// Execute bits for user, group, and other.
pub const EXECUTE_BITS: u32 = 0o111;

/// Add [`EXECUTE_BITS`] to `path`.
///
/// Returns `Ok(false)` when `path` does not exist (or on hosts without
/// Unix permissions) and `Ok(true)` once the bits are set.
///
/// # Errors
///
/// Returns an error if the file's metadata cannot be read or its
/// permissions cannot be changed.
#[cfg(unix)]
pub fn mark_executable(path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} not present; leaving permissions alone", path.display());
            return Ok(false);
        }
        Err(e) => return Err(e),
    };
    let mut permissions = metadata.permissions();
    permissions.set_mode(permissions.mode() | EXECUTE_BITS);
    std::fs::set_permissions(path, permissions)?;
    log::trace!("marked {} executable", path.display());
    Ok(true)
}

/// Add [`EXECUTE_BITS`] to `path`.
///
/// Windows has no execute bit, so nothing is changed.
///
/// # Errors
///
/// Never fails on this platform.
#[cfg(not(unix))]
pub fn mark_executable(path: &Path) -> io::Result<bool> {
    log::trace!("no execute bit to set on {}", path.display());
    Ok(false)
}

/// Mark every entry directly inside `dir` executable.
///
/// Returns the number of entries changed; a missing `dir` yields zero.
///
/// # Errors
///
/// Returns an error if `dir` exists but cannot be listed, or an entry's
/// permissions cannot be changed.
pub fn mark_directory_entries_executable(dir: &Path) -> io::Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }
    let mut marked = 0;
    for entry in std::fs::read_dir(dir)? {
        if mark_executable(&entry?.path())? {
            marked += 1;
        }
    }
    Ok(marked)
}
