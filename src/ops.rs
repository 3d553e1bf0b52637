//! Top-level archive operations.
//!
//! Each operation validates and resolves its paths before any archive is
//! opened, drives the mutation engine over one [`ArchiveHandle`], and closes
//! the handle on every path. Invalid input fails fast with an error; trouble
//! with single files or entries ends up in the returned result.
//!
//! # Example
//!
//! ```rust,no_run
//! use zipcraft::{CreateOptions, ExtractOptions, ops};
//!
//! let created = ops::create_archive(&["reports"], "reports.zip", &CreateOptions::new())?;
//! println!(
//!     "{}: {} entries, {} bytes",
//!     created.archive.path.display(),
//!     created.archive.entries,
//!     created.archive.size
//! );
//!
//! let extracted = ops::expand_archive("reports.zip", "restored", &ExtractOptions::new())?;
//! for (name, reason) in &extracted.failures {
//!     eprintln!("{}: {}", name, reason);
//! }
//! # Ok::<(), zipcraft::Error>(())
//! ```

use std::path::{Path, PathBuf};

use crate::edit::{AddResult, ExtractResult, add_paths, extract_entries};
use crate::entry::EntryInfo;
use crate::fs::ensure_directory;
use crate::handle::{ArchiveDescriptor, ArchiveHandle, OpenMode, with_archive};
use crate::options::{AddOptions, CreateOptions, ExtractOptions};
use crate::progress::{NoProgress, ProgressReporter};
use crate::resolve::{resolve_archive, resolve_destination, resolve_directory, resolve_sources};
use crate::Result;

/// Outcome of writing to an archive.
#[must_use = "the add result should be checked for conflicts and failures"]
#[derive(Debug, Clone)]
pub struct WriteOutcome {
    /// The archive after it was closed.
    pub archive: ArchiveDescriptor,
    /// What happened to each source file.
    pub result: AddResult,
}

/// Outcome of [`create_archive`].
pub type CreateOutcome = WriteOutcome;

/// Outcome of [`add_to_archive`].
pub type AddOutcome = WriteOutcome;

/// The entries of one archive.
#[derive(Debug, Clone)]
pub struct ArchiveListing {
    /// Path of the archive.
    pub path: PathBuf,
    /// Size of the archive file in bytes.
    pub size: u64,
    /// Entries in archive order.
    pub entries: Vec<EntryInfo>,
}

impl ArchiveListing {
    /// Returns the sum of uncompressed entry sizes.
    pub fn total_size(&self) -> u64 {
        self.entries.iter().map(|e| e.size).sum()
    }

    /// Returns the sum of compressed entry sizes.
    pub fn total_compressed_size(&self) -> u64 {
        self.entries.iter().map(|e| e.compressed_size).sum()
    }
}

/// Creates an archive at `destination` from files and directories.
///
/// An existing destination is replaced unless `options.no_clobber` is set,
/// in which case it is updated instead. Missing parent directories of the
/// destination are created.
///
/// # Errors
///
/// - [`Error::InvalidDestination`](crate::Error::InvalidDestination) for an unusable destination path.
/// - [`Error::PathNotFound`](crate::Error::PathNotFound) if a source does not exist or a pattern
///   matches nothing.
pub fn create_archive<P: AsRef<Path>>(
    sources: &[P],
    destination: impl AsRef<Path>,
    options: &CreateOptions,
) -> Result<CreateOutcome> {
    create_archive_with_progress(sources, destination, options, &mut NoProgress)
}

/// Like [`create_archive`], reporting each entry to `progress`.
pub fn create_archive_with_progress<P: AsRef<Path>>(
    sources: &[P],
    destination: impl AsRef<Path>,
    options: &CreateOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<CreateOutcome> {
    let destination = resolve_destination(destination)?;
    let sources = resolve_sources(sources, options.add.literal)?;
    prepare_parent(&destination)?;

    let mode = if options.no_clobber && destination.is_file() {
        OpenMode::Update
    } else {
        OpenMode::Create
    };
    log::debug!(
        "creating {} from {} source(s) ({:?})",
        destination.display(),
        sources.len(),
        mode
    );

    let (result, archive) = with_archive(&destination, mode, |handle| {
        add_paths(&sources, handle, &options.add, progress)
    })?;
    finish_write(&destination, result, archive)
}

/// Adds files and directories to the archive at `archive`.
///
/// Existing entries are kept. A missing archive is created.
///
/// # Errors
///
/// - [`Error::InvalidDestination`](crate::Error::InvalidDestination) for an unusable archive path.
/// - [`Error::PathNotFound`](crate::Error::PathNotFound) if a source does not exist.
/// - [`Error::Zip`](crate::Error::Zip) if the existing file is not a ZIP archive.
pub fn add_to_archive<P: AsRef<Path>>(
    sources: &[P],
    archive: impl AsRef<Path>,
    options: &AddOptions,
) -> Result<AddOutcome> {
    add_to_archive_with_progress(sources, archive, options, &mut NoProgress)
}

/// Like [`add_to_archive`], reporting each entry to `progress`.
pub fn add_to_archive_with_progress<P: AsRef<Path>>(
    sources: &[P],
    archive: impl AsRef<Path>,
    options: &AddOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<AddOutcome> {
    let archive = resolve_destination(archive)?;
    let sources = resolve_sources(sources, options.literal)?;
    prepare_parent(&archive)?;

    let (result, descriptor) = with_archive(&archive, OpenMode::Update, |handle| {
        add_paths(&sources, handle, options, progress)
    })?;
    finish_write(&archive, result, descriptor)
}

/// Lists the entries of each archive.
///
/// # Errors
///
/// Returns [`Error::ArchiveNotFound`](crate::Error::ArchiveNotFound) or a codec error for the first archive
/// that cannot be read.
pub fn list_entries<P: AsRef<Path>>(archives: &[P]) -> Result<Vec<ArchiveListing>> {
    let mut listings = Vec::with_capacity(archives.len());
    for archive in archives {
        let path = resolve_archive(archive)?;
        let size = std::fs::metadata(&path)?.len();
        let (entries, _) = with_archive(&path, OpenMode::Read, ArchiveHandle::entries)?;
        listings.push(ArchiveListing {
            path,
            size,
            entries,
        });
    }
    Ok(listings)
}

/// Extracts every entry of `archive` below `dest`.
///
/// The destination directory is created if needed.
///
/// # Errors
///
/// - [`Error::ArchiveNotFound`](crate::Error::ArchiveNotFound) if the archive does not exist.
/// - [`Error::InvalidDestination`](crate::Error::InvalidDestination) for an unusable destination.
/// - [`Error::DirectoryCreateFailed`](crate::Error::DirectoryCreateFailed) if the destination cannot be created.
pub fn expand_archive(
    archive: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractResult> {
    expand(archive.as_ref(), None, dest.as_ref(), options, &mut NoProgress)
}

/// Like [`expand_archive`], reporting each entry to `progress`.
pub fn expand_archive_with_progress(
    archive: impl AsRef<Path>,
    dest: impl AsRef<Path>,
    options: &ExtractOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<ExtractResult> {
    expand(archive.as_ref(), None, dest.as_ref(), options, progress)
}

/// Extracts the named entries of `archive` below `dest`.
///
/// Names not present in the archive are recorded as failures.
///
/// # Errors
///
/// Same as [`expand_archive`].
pub fn expand_entries<S: AsRef<str>>(
    archive: impl AsRef<Path>,
    names: &[S],
    dest: impl AsRef<Path>,
    options: &ExtractOptions,
) -> Result<ExtractResult> {
    expand_entries_with_progress(archive, names, dest, options, &mut NoProgress)
}

/// Like [`expand_entries`], reporting each entry to `progress`.
pub fn expand_entries_with_progress<S: AsRef<str>>(
    archive: impl AsRef<Path>,
    names: &[S],
    dest: impl AsRef<Path>,
    options: &ExtractOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<ExtractResult> {
    let names: Vec<String> = names.iter().map(|n| n.as_ref().to_string()).collect();
    expand(archive.as_ref(), Some(names.as_slice()), dest.as_ref(), options, progress)
}

fn expand(
    archive: &Path,
    names: Option<&[String]>,
    dest: &Path,
    options: &ExtractOptions,
    progress: &mut dyn ProgressReporter,
) -> Result<ExtractResult> {
    let archive = resolve_archive(archive)?;
    let dest = resolve_directory(dest)?;
    ensure_directory(&dest)?;
    log::debug!("expanding {} into {}", archive.display(), dest.display());

    let (result, _) = with_archive(&archive, OpenMode::Read, |handle| {
        extract_entries(handle, names, &dest, options, progress)
    })?;
    Ok(result)
}

/// Creates the directory an archive is written into.
fn prepare_parent(archive: &Path) -> Result<()> {
    match archive.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            ensure_directory(parent)?;
            Ok(())
        }
        _ => Ok(()),
    }
}

fn finish_write(
    path: &Path,
    result: AddResult,
    archive: Option<ArchiveDescriptor>,
) -> Result<WriteOutcome> {
    let archive = match archive {
        Some(archive) => archive,
        None => ArchiveDescriptor::read(path)?,
    };
    Ok(WriteOutcome { archive, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tempfile::TempDir;

    #[test]
    fn test_create_rejects_bad_destination_before_writing() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"a").unwrap();

        let err = create_archive(
            &[temp.path().join("a.txt")],
            temp.path().join("out").join(""),
            &CreateOptions::new(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDestination { .. }));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_bracketed_archive_name_round_trips() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"a").unwrap();
        let archive = temp.path().join("backup[1]").join("out*.zip");

        create_archive(&[temp.path().join("a.txt")], &archive, &CreateOptions::new()).unwrap();
        assert!(archive.is_file());

        let listings = list_entries(&[&archive]).unwrap();
        assert_eq!(listings[0].entries.len(), 1);
        assert_eq!(listings[0].entries[0].name, "a.txt");
    }

    #[test]
    fn test_create_with_missing_source_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.zip");

        let err =
            create_archive(&[temp.path().join("missing")], &dest, &CreateOptions::new()).unwrap_err();
        assert!(matches!(err, Error::PathNotFound { .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_create_makes_parent_directories() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"a").unwrap();
        let dest = temp.path().join("nested/dir/out.zip");

        let outcome =
            create_archive(&[temp.path().join("a.txt")], &dest, &CreateOptions::new()).unwrap();
        assert_eq!(outcome.archive.entries, 1);
        assert!(dest.is_file());
    }

    #[test]
    fn test_list_missing_archive() {
        let temp = TempDir::new().unwrap();
        let err = list_entries(&[temp.path().join("missing.zip")]).unwrap_err();
        assert!(matches!(err, Error::ArchiveNotFound { .. }));
    }

    #[test]
    fn test_listing_totals() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), b"aaaa").unwrap();
        std::fs::write(temp.path().join("b.txt"), b"bb").unwrap();
        let dest = temp.path().join("out.zip");
        create_archive(
            &[temp.path().join("a.txt"), temp.path().join("b.txt")],
            &dest,
            &CreateOptions::new(),
        )
        .unwrap();

        let listings = list_entries(&[&dest]).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].entries.len(), 2);
        assert_eq!(listings[0].total_size(), 6);
        assert!(listings[0].size > 0);
    }
}
