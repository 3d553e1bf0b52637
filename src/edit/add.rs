//! Adding filesystem paths to an archive.

use std::fs::File;
use std::path::Path;

use walkdir::WalkDir;

use crate::archive_path::{BaseContext, EntryName, map_entry_name};
use crate::handle::ArchiveHandle;
use crate::index::EntryIndex;
use crate::options::AddOptions;
use crate::progress::ProgressReporter;
use crate::resolve::{FilesystemPath, PathKind};
use crate::{Error, Result};

use super::result::{AddResult, AddedEntry};

/// Adds resolved filesystem paths to an open archive.
///
/// Files become entries named after their file name. Directories are walked
/// depth first with children in name order; the directory itself adds no
/// entry and no name segment, while each nested directory contributes its
/// own name to the entries below it. Empty directories add nothing.
///
/// An entry whose name already exists is skipped and recorded as a conflict
/// unless `options.overwrite` is set, in which case the old entry is deleted
/// before the new one is written. Failures of single files are recorded and
/// do not stop the batch.
///
/// # Errors
///
/// Only errors that invalidate the whole batch are returned, such as a
/// closed or read-only handle.
pub fn add_paths(
    paths: &[FilesystemPath],
    handle: &mut ArchiveHandle,
    options: &AddOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<AddResult> {
    let mut adder = Adder {
        handle,
        options,
        progress,
        result: AddResult::default(),
    };

    for path in paths {
        match path.kind() {
            PathKind::Directory => adder.add_directory(path.path())?,
            PathKind::File => {
                let name = path.file_name().unwrap_or_default();
                adder.add_file(path.path(), &name, &BaseContext::root())?;
            }
            PathKind::Missing => adder.fail(
                path.path().display().to_string(),
                Error::PathNotFound {
                    path: path.path().display().to_string(),
                },
            )?,
        }
    }

    let result = adder.result;
    log::debug!(
        "added {} entries ({} conflicts, {} failures)",
        result.added.len(),
        result.conflicts.len(),
        result.failures.len()
    );
    Ok(result)
}

struct Adder<'a> {
    handle: &'a mut ArchiveHandle,
    options: &'a AddOptions,
    progress: &'a mut dyn ProgressReporter,
    result: AddResult,
}

impl Adder<'_> {
    /// Walks `root` and adds every file below it.
    fn add_directory(&mut self, root: &Path) -> Result<()> {
        // contexts[d] is the base context for entries at depth d + 1.
        let mut contexts = vec![BaseContext::root()];

        for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let item = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    self.fail(item, Error::Io(e.into()))?;
                    continue;
                }
            };

            let depth = entry.depth();
            contexts.truncate(depth);
            let base = &contexts[depth - 1];
            let name = entry.file_name().to_string_lossy().into_owned();

            if entry.file_type().is_dir() {
                let child = base.child(&name);
                contexts.push(child);
                continue;
            }

            if entry.file_type().is_symlink() && !entry.path().is_file() {
                log::debug!("skipping symlink {}", entry.path().display());
                continue;
            }

            self.add_file(entry.path(), &name, base)?;
        }
        Ok(())
    }

    fn add_file(&mut self, source: &Path, file_name: &str, base: &BaseContext) -> Result<()> {
        if self.handle.owns_path(source) {
            log::debug!("skipping the archive being written: {}", source.display());
            return Ok(());
        }

        let name = match map_entry_name(file_name, base) {
            Ok(name) => name,
            Err(e) => return self.fail(source.display().to_string(), e),
        };

        if self.options.is_excluded(name.as_str()) {
            log::debug!("excluded '{}'", name);
            self.result.excluded.push(name.into_string());
            return Ok(());
        }

        let exists = self.handle.exists(name.as_str());
        if exists && !self.options.overwrite {
            let message = format!("Entry '{}' already exists, skipping", name);
            log::warn!("{}", message);
            self.progress.on_warning(&message);
            self.result.conflicts.push(name.into_string());
            return Ok(());
        }

        match self.write(source, &name, exists) {
            Ok(entry) => {
                self.progress.on_entry_complete(&entry.name, entry.size, true);
                self.result.added.push(entry);
                Ok(())
            }
            Err(e) => {
                self.progress.on_entry_complete(name.as_str(), 0, false);
                self.fail(name.into_string(), e)
            }
        }
    }

    /// Replaces (if needed) and writes a single entry.
    fn write(&mut self, source: &Path, name: &EntryName, exists: bool) -> Result<AddedEntry> {
        // Open the source before touching the archive so an unreadable file
        // never costs the entry it would replace.
        let mut file = File::open(source)?;
        self.progress
            .on_entry_start(name.as_str(), file.metadata().map(|m| m.len()).unwrap_or(0));

        let replaced = exists && self.handle.delete_if_exists(name.as_str())?;
        let size = self
            .handle
            .add_open_file(name, &mut file, self.options.compression)?;

        Ok(AddedEntry {
            name: name.to_string(),
            source: source.to_path_buf(),
            size,
            replaced,
        })
    }

    /// Records an item-level failure, or returns a fatal error.
    fn fail(&mut self, item: String, error: Error) -> Result<()> {
        if !error.is_item_level() && !matches!(error, Error::PathNotFound { .. }) {
            return Err(error);
        }
        log::warn!("Failed to add '{}': {}", item, error);
        self.progress
            .on_warning(&format!("Failed to add '{}': {}", item, error));
        self.result.failures.push((item, error.to_string()));
        Ok(())
    }
}
