//! Name-based lookup and removal of archive entries.
//!
//! Names map uniquely to entries, so replacing an entry is always
//! delete-then-add:
//!
//! ```rust,no_run
//! use zipcraft::{ArchiveHandle, CompressionLevel, EntryIndex, EntryName, OpenMode};
//!
//! let mut handle = ArchiveHandle::open("notes.zip", OpenMode::Update)?;
//! let name = EntryName::new("todo.txt")?;
//! handle.delete_if_exists(name.as_str())?;
//! handle.add_bytes(&name, b"- write tests", CompressionLevel::Optimal)?;
//! handle.close()?;
//! # Ok::<(), zipcraft::Error>(())
//! ```

use crate::entry::EntryInfo;
use crate::handle::ArchiveHandle;
use crate::Result;

/// Lookup over the live entries of an open archive.
///
/// Live entries are the original entries that were not deleted plus the
/// entries written since the archive was opened.
pub trait EntryIndex {
    /// Returns true if an entry with exactly this name is live.
    fn exists(&self, name: &str) -> bool;

    /// Removes the entry with this name, if any.
    ///
    /// Returns whether an entry was removed.
    fn delete_if_exists(&mut self, name: &str) -> Result<bool>;

    /// Returns the names of all live entries.
    fn entry_names(&self) -> Vec<String>;

    /// Returns the number of live entries.
    fn len(&self) -> usize {
        self.entry_names().len()
    }

    /// Returns true if there are no live entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EntryIndex for ArchiveHandle {
    fn exists(&self, name: &str) -> bool {
        self.session().is_some_and(|s| s.contains(name))
    }

    fn delete_if_exists(&mut self, name: &str) -> Result<bool> {
        let deleted = self.remove_entry(name)?;
        if deleted {
            log::debug!("deleted entry '{}'", name);
        }
        Ok(deleted)
    }

    fn entry_names(&self) -> Vec<String> {
        self.session().map(|s| s.live_names()).unwrap_or_default()
    }

    fn len(&self) -> usize {
        self.session().map_or(0, |s| s.live_count())
    }
}

impl ArchiveHandle {
    /// Returns metadata of the entries stored in the backing file, minus
    /// deleted ones.
    ///
    /// Entries written since the archive was opened are listed once the
    /// handle is closed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::HandleClosed`] after close, or a codec error if the
    /// central directory cannot be read.
    pub fn entries(&mut self) -> Result<Vec<EntryInfo>> {
        self.session_mut()?.original_entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CompressionLevel, EntryName, Error, OpenMode};
    use tempfile::TempDir;

    fn build(path: &std::path::Path, names: &[&str]) {
        let mut handle = ArchiveHandle::open(path, OpenMode::Create).unwrap();
        for name in names {
            handle
                .add_bytes(&EntryName::new(*name).unwrap(), name.as_bytes(), CompressionLevel::Optimal)
                .unwrap();
        }
        handle.close().unwrap();
    }

    #[test]
    fn test_exists_and_delete() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t.zip");
        build(&path, &["a.txt", "dir/b.txt"]);

        let mut handle = ArchiveHandle::open(&path, OpenMode::Update).unwrap();
        assert!(handle.exists("a.txt"));
        assert!(handle.exists("dir/b.txt"));
        assert!(!handle.exists("b.txt"));
        assert!(!handle.exists("A.TXT"));

        assert!(handle.delete_if_exists("a.txt").unwrap());
        assert!(!handle.exists("a.txt"));
        assert!(!handle.delete_if_exists("a.txt").unwrap());
        assert!(!handle.delete_if_exists("missing").unwrap());
        assert_eq!(handle.len(), 1);
        handle.close().unwrap();

        let handle = ArchiveHandle::open(&path, OpenMode::Read).unwrap();
        assert_eq!(handle.entry_names(), vec!["dir/b.txt"]);
    }

    #[test]
    fn test_staged_entries_are_live() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t.zip");
        build(&path, &["a.txt"]);

        let mut handle = ArchiveHandle::open(&path, OpenMode::Update).unwrap();
        handle
            .add_bytes(&EntryName::new("b.txt").unwrap(), b"b", CompressionLevel::Fastest)
            .unwrap();
        assert!(handle.exists("b.txt"));
        assert_eq!(handle.entry_names(), vec!["a.txt", "b.txt"]);
        assert_eq!(handle.len(), 2);
        assert!(!handle.is_empty());
    }

    #[test]
    fn test_entries_metadata() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t.zip");
        build(&path, &["a.txt", "b.txt"]);

        let mut handle = ArchiveHandle::open(&path, OpenMode::Read).unwrap();
        let entries = handle.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "a.txt");
        assert_eq!(entries[0].size, 5);
        assert_eq!(entries[0].method, "deflate");
        assert!(!entries[0].is_dir);
    }

    #[test]
    fn test_read_handle_cannot_delete() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t.zip");
        build(&path, &["a.txt"]);

        let mut handle = ArchiveHandle::open(&path, OpenMode::Read).unwrap();
        let err = handle.delete_if_exists("a.txt").unwrap_err();
        assert!(matches!(err, Error::ReadOnly { .. }));
    }

    #[test]
    fn test_closed_handle_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("t.zip");
        build(&path, &["a.txt"]);

        let mut handle = ArchiveHandle::open(&path, OpenMode::Read).unwrap();
        handle.close().unwrap();
        assert!(!handle.exists("a.txt"));
        assert!(handle.is_empty());
        assert!(matches!(handle.entries(), Err(Error::HandleClosed)));
    }
}
