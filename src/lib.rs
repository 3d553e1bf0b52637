//! # zipcraft
//!
//! A library for creating, updating, listing and extracting ZIP archives.
//!
//! Archives are built from files and directory trees on disk. Directory
//! structure below each source directory is kept in the entry names, which
//! always use `/` as separator regardless of the host platform. Existing
//! entries and existing files are never replaced silently: a clash is
//! skipped and reported unless overwriting is requested.
//!
//! ## Quick Start
//!
//! ### Creating an Archive
//!
//! ```rust,no_run
//! use zipcraft::{CompressionLevel, CreateOptions, Result, ops};
//!
//! fn main() -> Result<()> {
//!     let options = CreateOptions::new().compression(CompressionLevel::Fastest);
//!     let outcome = ops::create_archive(&["src", "README.md"], "backup.zip", &options)?;
//!
//!     println!(
//!         "Wrote {} entries ({} bytes)",
//!         outcome.archive.entries, outcome.archive.size
//!     );
//!     for name in &outcome.result.conflicts {
//!         eprintln!("skipped duplicate entry {}", name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Adding to an Archive
//!
//! ```rust,no_run
//! use zipcraft::{AddOptions, Result, ops};
//!
//! fn main() -> Result<()> {
//!     // Replace entries that already exist
//!     let options = AddOptions::new().overwrite(true);
//!     let outcome = ops::add_to_archive(&["notes/today.txt"], "backup.zip", &options)?;
//!     println!("{} entries replaced", outcome.result.replaced_count());
//!     Ok(())
//! }
//! ```
//!
//! ### Listing and Extracting
//!
//! ```rust,no_run
//! use zipcraft::{ExtractOptions, Result, ops};
//!
//! fn main() -> Result<()> {
//!     for listing in ops::list_entries(&["backup.zip"])? {
//!         for entry in &listing.entries {
//!             println!("{:>10} {}", entry.size, entry.name);
//!         }
//!     }
//!
//!     let result = ops::expand_archive("backup.zip", "./restored", &ExtractOptions::new())?;
//!     println!("Extracted {} files", result.files.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Working with Handles
//!
//! The operations in [`ops`] are built from an [`ArchiveHandle`] and the
//! engine functions in [`edit`]. A handle can also be driven directly:
//!
//! ```rust,no_run
//! use zipcraft::{ArchiveHandle, CompressionLevel, EntryIndex, EntryName, OpenMode, Result};
//!
//! fn main() -> Result<()> {
//!     let mut handle = ArchiveHandle::open("backup.zip", OpenMode::Update)?;
//!     let name = EntryName::new("VERSION")?;
//!     handle.delete_if_exists(name.as_str())?;
//!     handle.add_bytes(&name, b"1.2.0", CompressionLevel::NoCompression)?;
//!     handle.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`]. Invalid input (a bad destination, a
//! missing source, a missing archive) fails before any archive is opened.
//! Problems with single files or entries are collected in
//! [`AddResult`] and [`ExtractResult`] so the rest of a batch still goes
//! through.
//!
//! ## Safety
//!
//! Entry names are validated before extraction: names that are absolute,
//! carry a drive prefix or climb out of the destination with `..` are
//! rejected, as are targets that would resolve outside it through symlinks.
//!
//! ## Logging
//!
//! The library logs through the [`log`] facade: warnings for conflicts and
//! failed items, debug messages for archive lifecycle steps. Install any
//! `log` implementation to see them.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli` | No | Command-line interface tool |
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod archive_path;
pub mod edit;
pub mod entry;
pub mod error;
pub mod fs;
pub mod handle;
pub mod index;
pub mod ops;
pub mod options;
pub mod progress;
pub mod resolve;
pub mod safety;

mod timestamp;

pub use archive_path::{BaseContext, EntryName};
pub use edit::{AddResult, AddedEntry, ExtractResult, ExtractedFile};
pub use entry::EntryInfo;
pub use error::{Error, Result};
pub use handle::{ArchiveDescriptor, ArchiveHandle, OpenMode, with_archive};
pub use index::EntryIndex;
pub use ops::{AddOutcome, ArchiveListing, CreateOutcome, WriteOutcome};
pub use options::{AddOptions, CompressionLevel, CreateOptions, ExtractOptions};
pub use progress::{NoProgress, ProgressReporter, StatisticsProgress};
pub use resolve::{FilesystemPath, PathKind};
pub use safety::validate_extract_path;
