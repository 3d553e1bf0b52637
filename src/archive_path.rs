//! Entry name mapping between filesystem paths and archive entries.
//!
//! Entry names inside an archive always use `/` as separator, whatever the
//! host platform uses. This module computes canonical entry names for files
//! found while walking a source tree, and decomposes stored entry names back
//! into a directory part and a base name when extracting.

use std::fmt;
use std::path::{Component, Path};

use crate::{Error, Result};

/// Separator used for every entry name written by this crate.
pub const ENTRY_SEPARATOR: char = '/';

/// Legacy separator found in archives produced by some Windows tools.
pub const LEGACY_SEPARATOR: char = '\\';

const SEPARATORS: &[char] = &[ENTRY_SEPARATOR, LEGACY_SEPARATOR];

/// Maximum length of an entry name in bytes.
///
/// The ZIP local and central headers store the name length as a `u16`.
const MAX_NAME_LENGTH: usize = u16::MAX as usize;

/// A validated, `/`-separated entry name.
///
/// `EntryName` guarantees that:
/// - the name is non-empty and fits the ZIP name length field
/// - no NUL bytes are present
/// - the name is relative (no leading `/`)
/// - no empty, `.` or `..` segments are present
///
/// # Examples
///
/// ```
/// use zipcraft::EntryName;
///
/// let name = EntryName::new("dir/file.txt").unwrap();
/// assert_eq!(name.as_str(), "dir/file.txt");
/// assert_eq!(name.file_name(), "file.txt");
///
/// assert!(EntryName::new("").is_err());
/// assert!(EntryName::new("../secret").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryName(String);

impl EntryName {
    /// Creates a new `EntryName`, validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryName`] if the name is empty, too long,
    /// absolute, or contains NUL bytes, empty segments, `.` or `..`.
    pub fn new(s: &str) -> Result<Self> {
        Self::validate(s)?;
        Ok(Self(s.to_string()))
    }

    fn validate(s: &str) -> Result<()> {
        if s.is_empty() {
            return Err(Error::InvalidEntryName("empty name".into()));
        }
        if s.len() > MAX_NAME_LENGTH {
            return Err(Error::InvalidEntryName(format!(
                "name exceeds maximum length of {} bytes",
                MAX_NAME_LENGTH
            )));
        }
        if s.contains('\0') {
            return Err(Error::InvalidEntryName("contains NUL byte".into()));
        }
        if s.starts_with(ENTRY_SEPARATOR) {
            return Err(Error::InvalidEntryName(format!(
                "absolute name not allowed: {}",
                s
            )));
        }

        for segment in s.split(ENTRY_SEPARATOR) {
            match segment {
                "" => {
                    return Err(Error::InvalidEntryName(format!(
                        "empty segment in '{}'",
                        s
                    )));
                }
                "." | ".." => {
                    return Err(Error::InvalidEntryName(format!(
                        "'{}' segment not allowed in '{}'",
                        segment, s
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Builds an entry name from a relative host path.
    ///
    /// Each normal component becomes one `/`-separated segment, so the result
    /// is the same on every platform.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEntryName`] if the path is absolute, contains
    /// `..`, or has no normal components.
    pub fn from_relative_path(path: &Path) -> Result<Self> {
        let mut base = BaseContext::root();
        let mut last: Option<String> = None;

        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    if let Some(prev) = last.take() {
                        base = base.child(&prev);
                    }
                    last = Some(part.to_string_lossy().into_owned());
                }
                Component::CurDir => {}
                _ => {
                    return Err(Error::InvalidEntryName(format!(
                        "not a relative path: {}",
                        path.display()
                    )));
                }
            }
        }

        match last {
            Some(name) => map_entry_name(&name, &base),
            None => Err(Error::InvalidEntryName("empty name".into())),
        }
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the last segment of the name.
    pub fn file_name(&self) -> &str {
        self.0.rsplit(ENTRY_SEPARATOR).next().unwrap_or(&self.0)
    }

    /// Returns the segments of the name.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split(ENTRY_SEPARATOR)
    }

    /// Consumes the name, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for EntryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for EntryName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for EntryName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::validate(&s)?;
        Ok(Self(s))
    }
}

/// The relative prefix accumulated while walking a source directory tree.
///
/// The root context is empty: files directly inside a top-level source
/// directory map to their bare names. Each level below derives a fresh
/// context with [`BaseContext::child`]; contexts are never mutated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseContext(String);

impl BaseContext {
    /// Returns the empty context used for top-level paths.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Returns the context for children of `dir_name` inside this context.
    pub fn child(&self, dir_name: &str) -> Self {
        if self.0.is_empty() {
            Self(dir_name.to_string())
        } else {
            Self(format!("{}{}{}", self.0, ENTRY_SEPARATOR, dir_name))
        }
    }

    /// Returns true for the root context.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the accumulated prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Computes the entry name for `name` inside `base`.
///
/// Produces `{base}/{name}` when the base is non-empty and `{name}` otherwise.
///
/// # Errors
///
/// A zero-length name is invalid and yields [`Error::InvalidEntryName`], as
/// does any name rejected by [`EntryName::new`]. A `/` or `\` inside `name`,
/// or a `\` inside the context, is rejected as well.
///
/// # Examples
///
/// ```
/// use zipcraft::archive_path::{BaseContext, map_entry_name};
///
/// let root = BaseContext::root();
/// assert_eq!(map_entry_name("a.txt", &root).unwrap().as_str(), "a.txt");
///
/// let sub = root.child("S").child("T");
/// assert_eq!(map_entry_name("c.txt", &sub).unwrap().as_str(), "S/T/c.txt");
/// ```
pub fn map_entry_name(name: &str, base: &BaseContext) -> Result<EntryName> {
    if name.is_empty() {
        return Err(Error::InvalidEntryName("zero-length name".into()));
    }
    if name.contains(SEPARATORS) || base.as_str().contains(LEGACY_SEPARATOR) {
        return Err(Error::InvalidEntryName(format!(
            "separator character in file name: {}",
            name
        )));
    }
    if base.is_root() {
        EntryName::new(name)
    } else {
        EntryName::try_from(format!("{}{}{}", base.as_str(), ENTRY_SEPARATOR, name))
    }
}

/// Splits a stored entry name into its directory part and base name.
///
/// Both `/` and the legacy `\` separator are recognized. The directory part
/// keeps no trailing separator. A name ending with a separator has an empty
/// base name and denotes a directory placeholder.
///
/// # Examples
///
/// ```
/// use zipcraft::archive_path::split_entry_name;
///
/// assert_eq!(split_entry_name("a/b/c.txt"), ("a/b", "c.txt"));
/// assert_eq!(split_entry_name("a\\b\\c.txt"), ("a\\b", "c.txt"));
/// assert_eq!(split_entry_name("c.txt"), ("", "c.txt"));
/// assert_eq!(split_entry_name("dir/"), ("dir", ""));
/// ```
pub fn split_entry_name(name: &str) -> (&str, &str) {
    match name.rfind(SEPARATORS) {
        Some(idx) => (&name[..idx], &name[idx + 1..]),
        None => ("", name),
    }
}

/// Returns true if the stored name denotes a directory placeholder.
pub fn is_directory_placeholder(name: &str) -> bool {
    split_entry_name(name).1.is_empty()
}

/// Splits a stored entry name into its segments, accepting both separators.
///
/// Empty segments (from leading, doubled or trailing separators) are dropped.
pub fn entry_segments(name: &str) -> impl Iterator<Item = &str> {
    name.split(SEPARATORS)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_simple_name() {
        let name = EntryName::new("file.txt").unwrap();
        assert_eq!(name.as_str(), "file.txt");
        assert_eq!(name.file_name(), "file.txt");
    }

    #[test]
    fn test_valid_nested_name() {
        let name = EntryName::new("a/b/c.txt").unwrap();
        let parts: Vec<_> = name.components().collect();
        assert_eq!(parts, vec!["a", "b", "c.txt"]);
        assert_eq!(name.file_name(), "c.txt");
    }

    #[test]
    fn test_valid_unicode() {
        let name = EntryName::new("日本語/файл.txt").unwrap();
        assert_eq!(name.as_str(), "日本語/файл.txt");
    }

    #[test]
    fn test_invalid_names() {
        for bad in ["", "/etc/passwd", "a//b", "dir/", "./x", "a/../b", "..", "x\0y"] {
            let err = EntryName::new(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidEntryName(_)), "{:?}", bad);
        }
    }

    #[test]
    fn test_name_too_long() {
        let long = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(EntryName::new(&long).is_err());
        assert!(EntryName::new(&long[..MAX_NAME_LENGTH]).is_ok());
    }

    #[test]
    fn test_map_root_context() {
        let name = map_entry_name("a.txt", &BaseContext::root()).unwrap();
        assert_eq!(name.as_str(), "a.txt");
    }

    #[test]
    fn test_map_nested_context() {
        let base = BaseContext::root().child("S");
        assert_eq!(base.as_str(), "S");
        let name = map_entry_name("c.txt", &base).unwrap();
        assert_eq!(name.as_str(), "S/c.txt");

        let deeper = base.child("T");
        assert_eq!(deeper.as_str(), "S/T");
        assert_eq!(
            map_entry_name("d.txt", &deeper).unwrap().as_str(),
            "S/T/d.txt"
        );
    }

    #[test]
    fn test_map_zero_length_rejected() {
        let err = map_entry_name("", &BaseContext::root()).unwrap_err();
        assert!(matches!(err, Error::InvalidEntryName(_)));
        let err = map_entry_name("", &BaseContext::root().child("S")).unwrap_err();
        assert!(matches!(err, Error::InvalidEntryName(_)));
    }

    #[test]
    fn test_map_rejects_separator_in_file_name() {
        let root = BaseContext::root();
        for bad in ["a\\b.txt", "a/b.txt"] {
            let err = map_entry_name(bad, &root).unwrap_err();
            assert!(matches!(err, Error::InvalidEntryName(_)), "{:?}", bad);
        }
        let err = map_entry_name("c.txt", &root.child("x\\y")).unwrap_err();
        assert!(matches!(err, Error::InvalidEntryName(_)));
    }

    #[test]
    fn test_child_does_not_mutate_parent() {
        let root = BaseContext::root();
        let a = root.child("a");
        let b = root.child("b");
        assert!(root.is_root());
        assert_eq!(a.as_str(), "a");
        assert_eq!(b.as_str(), "b");
    }

    #[test]
    fn test_from_relative_path() {
        let path: PathBuf = ["S", "T", "c.txt"].iter().collect();
        let name = EntryName::from_relative_path(&path).unwrap();
        assert_eq!(name.as_str(), "S/T/c.txt");

        let name = EntryName::from_relative_path(Path::new("./x.txt")).unwrap();
        assert_eq!(name.as_str(), "x.txt");
    }

    #[test]
    fn test_from_relative_path_rejects_escapes() {
        assert!(EntryName::from_relative_path(Path::new("../x")).is_err());
        assert!(EntryName::from_relative_path(Path::new("/abs/x")).is_err());
        assert!(EntryName::from_relative_path(Path::new("")).is_err());
    }

    #[test]
    fn test_split_entry_name() {
        assert_eq!(split_entry_name("a/b/c.txt"), ("a/b", "c.txt"));
        assert_eq!(split_entry_name("c.txt"), ("", "c.txt"));
        assert_eq!(split_entry_name("dir/"), ("dir", ""));
        assert_eq!(split_entry_name("a\\b.txt"), ("a", "b.txt"));
        assert_eq!(split_entry_name("a/b\\c.txt"), ("a/b", "c.txt"));
    }

    #[test]
    fn test_directory_placeholder() {
        assert!(is_directory_placeholder("dir/"));
        assert!(is_directory_placeholder("a\\b\\"));
        assert!(!is_directory_placeholder("dir/file"));
    }

    #[test]
    fn test_entry_segments() {
        let parts: Vec<_> = entry_segments("a\\b/c.txt").collect();
        assert_eq!(parts, vec!["a", "b", "c.txt"]);
        let parts: Vec<_> = entry_segments("/a//b/").collect();
        assert_eq!(parts, vec!["a", "b"]);
    }
}
