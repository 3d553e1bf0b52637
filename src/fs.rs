//! Filesystem helpers for extraction targets.
//!
//! Writing a file into a directory chain that does not exist yet fails, so
//! every destination directory is materialized with [`ensure_directory`]
//! before a file is created inside it.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use filetime::FileTime;

use crate::{Error, Result};

/// Buffer size used when streaming entry data to disk.
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Ensures `path` exists as a directory, creating missing ancestors.
///
/// Returns the path unchanged when it already is a directory.
///
/// # Errors
///
/// Returns [`Error::DirectoryCreateFailed`] if the path (or one of its
/// ancestors) exists as a non-directory, or if creation is denied.
pub fn ensure_directory(path: &Path) -> Result<PathBuf> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => return Ok(path.to_path_buf()),
        Ok(_) => {
            return Err(Error::DirectoryCreateFailed {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "not a directory"),
            });
        }
        Err(_) => {}
    }

    std::fs::create_dir_all(path).map_err(|source| Error::DirectoryCreateFailed {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("created directory {}", path.display());
    Ok(path.to_path_buf())
}

/// Returns true if anything other than a directory occupies `path`.
///
/// Symlinks count as occupied whatever they point to, dangling ones
/// included.
pub fn is_occupied(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|m| !m.is_dir())
        .unwrap_or(false)
}

/// Removes a symlink at `path` so the next create cannot follow it.
fn unlink_symlink(path: &Path) -> io::Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            log::debug!("replacing symlink {}", path.display());
            std::fs::remove_file(path)
        }
        _ => Ok(()),
    }
}

/// Streams `reader` into `path`, creating or truncating the file.
///
/// A symlink at `path` is replaced by a regular file rather than followed.
/// Returns the number of bytes written. A partially written file is removed
/// when the copy fails.
pub fn write_file(path: &Path, reader: &mut impl Read) -> Result<u64> {
    unlink_symlink(path)?;
    let file = File::create(path)?;
    let mut writer = io::BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);

    let copied = io::copy(reader, &mut writer).and_then(|n| writer.flush().map(|_| n));
    match copied {
        Ok(n) => Ok(n),
        Err(e) => {
            drop(writer);
            if let Err(cleanup) = std::fs::remove_file(path) {
                log::warn!(
                    "Failed to clean up partial file '{}': {}",
                    path.display(),
                    cleanup
                );
            }
            Err(Error::Io(e))
        }
    }
}

/// Sets the modification time of an extracted file.
///
/// Failures are logged and otherwise ignored.
pub fn restore_mtime(path: &Path, modified: SystemTime) {
    let mtime = FileTime::from_system_time(modified);
    if let Err(e) = filetime::set_file_mtime(path, mtime) {
        log::warn!(
            "Failed to set modification time on '{}': {}",
            path.display(),
            e
        );
    }
}
