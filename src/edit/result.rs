//! Outcomes of add and extract batches.

use std::path::PathBuf;

/// A file that was written into an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedEntry {
    /// The entry name inside the archive.
    pub name: String,
    /// The file the entry was read from.
    pub source: PathBuf,
    /// Uncompressed size in bytes.
    pub size: u64,
    /// Whether an existing entry with the same name was replaced.
    pub replaced: bool,
}

/// Result of adding filesystem paths to an archive.
#[must_use = "add result should be checked for conflicts and failures"]
#[derive(Debug, Clone, Default)]
pub struct AddResult {
    /// Entries written, in processing order.
    pub added: Vec<AddedEntry>,
    /// Entry names skipped because they already existed.
    pub conflicts: Vec<String>,
    /// Entry names skipped by an exclusion pattern.
    pub excluded: Vec<String>,
    /// Items that failed, with the reason.
    pub failures: Vec<(String, String)>,
}

impl AddResult {
    /// Returns true if no item failed.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns true if some entries were skipped as conflicts.
    pub fn has_warnings(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Returns the total uncompressed bytes added.
    pub fn bytes_added(&self) -> u64 {
        self.added.iter().map(|e| e.size).sum()
    }

    /// Returns the number of entries that replaced an existing one.
    pub fn replaced_count(&self) -> usize {
        self.added.iter().filter(|e| e.replaced).count()
    }
}

/// A file written during extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFile {
    /// The entry the file was extracted from.
    pub name: String,
    /// The file that was written.
    pub path: PathBuf,
    /// Bytes written.
    pub size: u64,
}

/// Result of extracting entries.
#[must_use = "extract result should be checked for conflicts and failures"]
#[derive(Debug, Clone, Default)]
pub struct ExtractResult {
    /// Files written, in archive order.
    pub files: Vec<ExtractedFile>,
    /// Directories materialized from placeholder entries.
    pub directories: Vec<PathBuf>,
    /// Entry names skipped because the target file already existed.
    pub conflicts: Vec<String>,
    /// Entries that failed, with the reason.
    pub failures: Vec<(String, String)>,
}

impl ExtractResult {
    /// Returns true if no entry failed.
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns true if some entries were skipped as conflicts.
    pub fn has_warnings(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Returns the total bytes written.
    pub fn bytes_extracted(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}
