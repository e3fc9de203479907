//! Writing an extracted artifact tree back into a `.zip` archive.
//!
//! Entries are named relative to the source directory with `/`
//! separators, added in sorted order so repeated runs produce the same
//! layout. On Unix each entry keeps the permission bits it has on disk,
//! which is how execute bits set after extraction reach the archive.

use super::packaging_error::PackagingError;
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Mode recorded for entries when the host has no Unix permissions.
const DEFAULT_FILE_MODE: u32 = 0o644;
const DEFAULT_DIR_MODE: u32 = 0o755;

/// Create a `.zip` at `output_path` holding every file and directory
/// under `source_dir`.
///
/// `source_dir` itself is not an entry; its children sit at the archive
/// root. Returns the number of files written (directories excluded).
///
/// # Errors
///
/// Returns [`PackagingError::Io`] if the tree cannot be walked or a file
/// cannot be read, [`PackagingError::Zip`] if the archive cannot be
/// written, and [`PackagingError::NonUtf8Path`] for entries whose names
/// are not valid UTF-8.
pub fn create_zip_from_dir(source_dir: &Path, output_path: &Path) -> Result<usize, PackagingError> {
    let output = fs::File::create(output_path)?;
    let mut writer = ZipWriter::new(BufWriter::new(output));
    let mut files = 0;

    for path in walk_sorted(source_dir)? {
        let name = entry_name(source_dir, &path)?;
        let metadata = fs::metadata(&path)?;
        if metadata.is_dir() {
            let options = options_for(&metadata, DEFAULT_DIR_MODE);
            writer.add_directory(name, options)?;
            continue;
        }

        let options = options_for(&metadata, DEFAULT_FILE_MODE);
        writer.start_file(name.as_str(), options)?;
        let mut source = fs::File::open(&path)?;
        io::copy(&mut source, &mut writer)?;
        log::trace!("added {name}");
        files += 1;
    }

    writer.finish()?;
    Ok(files)
}

/// Every path below `root`, depth first, each directory's children sorted
/// by file name.
fn walk_sorted(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut children = fs::read_dir(root)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    children.sort();

    let mut paths = Vec::new();
    for child in children {
        let is_dir = fs::metadata(&child)?.is_dir();
        paths.push(child.clone());
        if is_dir {
            paths.extend(walk_sorted(&child)?);
        }
    }
    Ok(paths)
}

fn entry_name(root: &Path, path: &Path) -> Result<String, PackagingError> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| PackagingError::StripPrefix {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })?;
    let parts = relative
        .components()
        .map(|component| {
            component
                .as_os_str()
                .to_str()
                .ok_or_else(|| PackagingError::NonUtf8Path(path.to_path_buf()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn options_for(metadata: &fs::Metadata, _fallback: u32) -> SimpleFileOptions {
    use std::os::unix::fs::PermissionsExt;

    SimpleFileOptions::default().unix_permissions(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn options_for(_metadata: &fs::Metadata, fallback: u32) -> SimpleFileOptions {
    SimpleFileOptions::default().unix_permissions(fallback)
}

#[cfg(test)]
#[path = "packaging_tests.rs"]
mod tests;
