//! Low-level filesystem helpers shared by the file operations.

use crate::constants::{UPLOAD_TEMP_PREFIX, UPLOAD_TEMP_SUFFIX};
use crate::paths::is_reserved_name;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Counts of entries removed by [`remove_dir_bottom_up`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RemovalStats {
    pub(crate) files: usize,
    pub(crate) dirs: usize,
}

/// Writes `bytes` to `dest`, replacing any existing file.
///
/// The data is written to a uniquely named temporary file in the same directory
/// and then renamed over `dest`, so readers and concurrent writers never observe
/// a partially written file. The temporary file is removed if any step fails.
pub(crate) fn write_replacing(dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = dest.parent().ok_or_else(|| {
        io::Error::new(
            ErrorKind::InvalidInput,
            format!("{} has no parent directory", dest.display()),
        )
    })?;
    let temp = temp_path(dir);

    let result = write_then_rename(&temp, dest, bytes);
    if result.is_err() {
        let _ = fs::remove_file(&temp);
    }
    result
}

fn write_then_rename(temp: &Path, dest: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(temp)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    fs::rename(temp, dest)
}

fn temp_path(dir: &Path) -> PathBuf {
    dir.join(format!(
        "{UPLOAD_TEMP_PREFIX}{}{UPLOAD_TEMP_SUFFIX}",
        uuid::Uuid::new_v4().simple()
    ))
}

/// Whether `name` is an in-flight upload written by [`write_replacing`].
pub(crate) fn is_upload_temp(name: &OsStr) -> bool {
    name.to_str().is_some_and(is_reserved_name)
}

/// Recursively removes `dir`, deleting children before their parents.
///
/// Symbolic links are removed, never followed, including when `dir` itself is
/// one. Entries that disappear while the walk is running (another delete of the
/// same tree) are not errors.
pub(crate) fn remove_dir_bottom_up(dir: &Path) -> io::Result<RemovalStats> {
    let mut stats = RemovalStats::default();
    let file_type = match fs::symlink_metadata(dir) {
        Ok(metadata) => metadata.file_type(),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(stats),
        Err(e) => return Err(e),
    };

    if file_type.is_dir() {
        remove_recursive(dir, &mut stats)?;
    } else if ignore_not_found(fs::remove_file(dir))? {
        stats.files += 1;
    }
    Ok(stats)
}

fn remove_recursive(dir: &Path, stats: &mut RemovalStats) -> io::Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    for entry in entries {
        let entry = entry?;
        let path = entry.path();

        if entry.file_type()?.is_dir() {
            remove_recursive(&path, stats)?;
        } else if ignore_not_found(fs::remove_file(&path))? {
            stats.files += 1;
        }
    }

    if ignore_not_found(fs::remove_dir(dir))? {
        stats.dirs += 1;
    }
    Ok(())
}

/// Maps `NotFound` to `Ok(false)`; `Ok(true)` means the entry was removed by this call.
fn ignore_not_found(result: io::Result<()>) -> io::Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
