//! Error types for ZIP archive operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when creating, updating, listing or extracting archives,
//! along with a convenient [`Result<T>`] type alias.
//!
//! # Fatal and per-item errors
//!
//! Validation errors (bad destination, missing source, missing archive) are
//! returned from the top-level operations before any archive is touched.
//! Errors that concern a single file or entry during a batch are collected
//! into [`AddResult`] / [`ExtractResult`] instead, so sibling items keep
//! being processed:
//!
//! ```rust,no_run
//! use zipcraft::{Error, ExtractOptions, ops};
//!
//! fn expand(archive: &str, dest: &str) -> zipcraft::Result<()> {
//!     match ops::expand_archive(archive, dest, &ExtractOptions::default()) {
//!         Ok(result) => {
//!             for (name, reason) in &result.failures {
//!                 eprintln!("{}: {}", name, reason);
//!             }
//!             Ok(())
//!         }
//!         Err(Error::ArchiveNotFound { path }) => {
//!             eprintln!("No such archive: {}", path.display());
//!             Ok(())
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```
//!
//! [`AddResult`]: crate::edit::AddResult
//! [`ExtractResult`]: crate::edit::ExtractResult

use std::io;
use std::path::PathBuf;

/// The main error type for ZIP archive operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io], [`DirectoryCreateFailed`][Self::DirectoryCreateFailed] | File system operations |
/// | Format | [`Zip`][Self::Zip] | Invalid or corrupt archive data |
/// | Validation | [`InvalidDestination`][Self::InvalidDestination], [`PathNotFound`][Self::PathNotFound], [`ArchiveNotFound`][Self::ArchiveNotFound] | Bad user input |
/// | Entries | [`EntryConflict`][Self::EntryConflict], [`EntryNotFound`][Self::EntryNotFound], [`InvalidEntryName`][Self::InvalidEntryName] | Name clashes and lookups |
/// | Security | [`PathTraversal`][Self::PathTraversal] | Entry escaping the destination |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The ZIP codec rejected the archive or an entry.
    ///
    /// Returned when the archive is not a valid ZIP file, an entry is
    /// corrupt, or an entry uses an unsupported compression method.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A destination path is not a syntactically valid filesystem path.
    ///
    /// Raised before any archive is opened.
    #[error("Invalid destination '{path}': {reason}")]
    InvalidDestination {
        /// The path as supplied by the caller.
        path: String,
        /// Why the path was rejected.
        reason: &'static str,
    },

    /// A required source path does not exist after resolution.
    #[error("Path not found: {path}")]
    PathNotFound {
        /// The path (or pattern) as supplied by the caller.
        path: String,
    },

    /// The archive to read does not exist.
    #[error("Archive not found: {}", path.display())]
    ArchiveNotFound {
        /// The resolved archive path.
        path: PathBuf,
    },

    /// The target entry or file already exists and overwriting was not requested.
    ///
    /// This is reported as a warning: the item is skipped and the batch
    /// continues.
    #[error("Entry already exists: {name}")]
    EntryConflict {
        /// The entry name or target file path.
        name: String,
    },

    /// A requested entry is not present in the archive.
    #[error("Entry not found: {name}")]
    EntryNotFound {
        /// The requested entry name.
        name: String,
    },

    /// A destination directory could not be created.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreateFailed {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying filesystem error.
        #[source]
        source: io::Error,
    },

    /// An entry name is empty or otherwise unusable inside an archive.
    #[error("Invalid entry name: {0}")]
    InvalidEntryName(String),

    /// An entry would be extracted outside the destination directory.
    #[error("Path traversal detected in entry: {name}")]
    PathTraversal {
        /// The offending entry name.
        name: String,
    },

    /// A glob pattern could not be parsed.
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern as supplied by the caller.
        pattern: String,
        /// The parser's explanation.
        reason: String,
    },

    /// The archive handle was used after it was closed.
    #[error("Archive handle is already closed")]
    HandleClosed,

    /// A mutation was attempted on a handle opened for reading.
    #[error("Archive is open read-only: {}", path.display())]
    ReadOnly {
        /// The archive path.
        path: PathBuf,
    },
}

impl Error {
    /// Returns true if this error only concerns a single item of a batch.
    ///
    /// Item-level errors raised while adding or extracting are recorded in
    /// the operation result; everything else aborts the operation. Codec
    /// errors count as item-level here since a single corrupt or unsupported
    /// entry does not affect its siblings.
    pub fn is_item_level(&self) -> bool {
        matches!(
            self,
            Error::EntryConflict { .. }
                | Error::EntryNotFound { .. }
                | Error::DirectoryCreateFailed { .. }
                | Error::InvalidEntryName(_)
                | Error::PathTraversal { .. }
                | Error::Io(_)
                | Error::Zip(_)
        )
    }
}

impl From<tempfile::PersistError> for Error {
    fn from(err: tempfile::PersistError) -> Self {
        Error::Io(err.error)
    }
}

/// A specialized Result type for archive operations.
pub type Result<T> = std::result::Result<T, Error>;
