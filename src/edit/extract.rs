//! Extracting archive entries to the filesystem.

use std::path::Path;

use crate::archive_path::{is_directory_placeholder, split_entry_name};
use crate::fs::{ensure_directory, is_occupied, restore_mtime, write_file};
use crate::handle::ArchiveHandle;
use crate::index::EntryIndex;
use crate::options::ExtractOptions;
use crate::progress::ProgressReporter;
use crate::safety::validate_extract_path;
use crate::{Error, Result};

use super::result::{ExtractResult, ExtractedFile};

/// Extracts entries of an open archive below `dest`.
///
/// With `names` set to `None` every entry is extracted in archive order;
/// otherwise only the named entries, and unknown names are recorded as
/// failures. Entry names may use `/` or `\` as separator.
///
/// Directory placeholder entries (names ending in a separator) create the
/// directory. For files, the parent directory chain is created first; an
/// existing target file or symlink is left alone and recorded as a conflict
/// unless `options.overwrite` is set, in which case a symlink is replaced
/// rather than followed. Names that would escape `dest` are rejected.
/// Extracted files get the modification time stored in the entry.
///
/// `dest` must already exist.
///
/// # Errors
///
/// Only errors that invalidate the whole batch are returned, such as a
/// closed handle.
pub fn extract_entries(
    handle: &mut ArchiveHandle,
    names: Option<&[String]>,
    dest: &Path,
    options: &ExtractOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<ExtractResult> {
    if !handle.is_open() {
        return Err(Error::HandleClosed);
    }

    let selected = match names {
        Some(names) => names.to_vec(),
        None => handle.entry_names(),
    };
    progress.on_total_entries(selected.len());

    let mut result = ExtractResult::default();
    for name in selected {
        progress.on_entry_start(&name, 0);
        match extract_one(handle, &name, dest, options, &mut result) {
            Ok(Extracted::File(bytes)) => progress.on_entry_complete(&name, bytes, true),
            Ok(Extracted::Directory) => progress.on_entry_complete(&name, 0, true),
            Ok(Extracted::Conflict) => {
                progress.on_warning(&format!("File for '{}' already exists, skipping", name));
                progress.on_entry_complete(&name, 0, false);
            }
            Err(e) if e.is_item_level() => {
                let message = format!("Failed to extract '{}': {}", name, e);
                log::warn!("{}", message);
                progress.on_warning(&message);
                progress.on_entry_complete(&name, 0, false);
                result.failures.push((name, e.to_string()));
            }
            Err(e) => return Err(e),
        }
    }

    log::debug!(
        "extracted {} files ({} conflicts, {} failures)",
        result.files.len(),
        result.conflicts.len(),
        result.failures.len()
    );
    Ok(result)
}

enum Extracted {
    File(u64),
    Directory,
    Conflict,
}

/// Extracts a single entry, recording it in `result`.
fn extract_one(
    handle: &mut ArchiveHandle,
    name: &str,
    dest: &Path,
    options: &ExtractOptions,
    result: &mut ExtractResult,
) -> Result<Extracted> {
    if !handle.exists(name) {
        return Err(Error::EntryNotFound {
            name: name.to_string(),
        });
    }

    let target = validate_extract_path(name, dest)?;

    if is_directory_placeholder(name) {
        ensure_directory(&target)?;
        result.directories.push(target);
        return Ok(Extracted::Directory);
    }

    let (dir_part, _) = split_entry_name(name);
    let target_dir = validate_extract_path(dir_part, dest)?;
    ensure_directory(&target_dir)?;

    if !options.overwrite && is_occupied(&target) {
        log::warn!(
            "File '{}' already exists, skipping entry '{}'",
            target.display(),
            name
        );
        result.conflicts.push(name.to_string());
        return Ok(Extracted::Conflict);
    }

    let (size, modified) = handle.read_entry_with_mtime(name, |mut reader, modified| {
        Ok((write_file(&target, &mut reader)?, modified))
    })?;
    if let Some(modified) = modified {
        restore_mtime(&target, modified);
    }
    log::debug!("extracted '{}' to {}", name, target.display());
    result.files.push(ExtractedFile {
        name: name.to_string(),
        path: target,
        size,
    });
    Ok(Extracted::File(size))
}
