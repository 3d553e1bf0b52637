//! The archive mutation engine.
//!
//! Adding and extracting work entry by entry on an open [`ArchiveHandle`]:
//!
//! - [`add_paths`] maps files and directory trees to entry names and writes
//!   them, skipping or replacing existing names according to the options.
//! - [`extract_entries`] writes entries below a destination directory,
//!   creating the directory chain each file needs.
//!
//! A failure of one file or entry is recorded in the returned
//! [`AddResult`] / [`ExtractResult`] and the batch goes on.
//!
//! # Example
//!
//! ```rust,no_run
//! use zipcraft::edit::{add_paths, extract_entries};
//! use zipcraft::progress::NoProgress;
//! use zipcraft::resolve::resolve_sources;
//! use zipcraft::{AddOptions, ArchiveHandle, ExtractOptions, OpenMode};
//! use std::path::Path;
//!
//! let sources = resolve_sources(&["docs"], false)?;
//! let mut handle = ArchiveHandle::open("docs.zip", OpenMode::Update)?;
//! let added = add_paths(&sources, &mut handle, &AddOptions::new(), &mut NoProgress)?;
//! handle.close()?;
//! println!("added {} entries", added.added.len());
//!
//! let mut handle = ArchiveHandle::open("docs.zip", OpenMode::Read)?;
//! let options = ExtractOptions::new().overwrite(true);
//! let extracted = extract_entries(&mut handle, None, Path::new("out"), &options, &mut NoProgress)?;
//! println!("extracted {} files", extracted.files.len());
//! # Ok::<(), zipcraft::Error>(())
//! ```
//!
//! [`ArchiveHandle`]: crate::ArchiveHandle

mod add;
mod extract;
mod result;

pub use add::add_paths;
pub use extract::extract_entries;
pub use result::{AddResult, AddedEntry, ExtractResult, ExtractedFile};
