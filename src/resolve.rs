//! Resolution of user-supplied paths.
//!
//! Source paths may be relative, may carry a provider-style prefix such as
//! `file://` or `FileSystem::`, and are glob-expanded unless the caller asks
//! for literal handling. Every resolved path is absolute. Resolution has no
//! side effects: destination directories are created later, right before
//! anything is written into them.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Characters that make a path a glob pattern.
const GLOB_CHARS: &[char] = &['*', '?', '['];

/// URI scheme stripped from user input.
const FILE_SCHEME: &str = "file://";

/// Provider qualifiers accepted before a `::` separator.
const FILESYSTEM_PROVIDERS: &[&str] = &["FileSystem", "Microsoft.PowerShell.Core\\FileSystem"];

/// What a resolved path points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A regular file (or a symlink to one).
    File,
    /// A directory (or a symlink to one).
    Directory,
    /// Nothing exists at the path.
    Missing,
}

impl PathKind {
    /// Classifies what currently exists at `path`.
    pub fn of(path: &Path) -> Self {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_dir() => Self::Directory,
            Ok(_) => Self::File,
            Err(_) => Self::Missing,
        }
    }
}

/// An absolute filesystem path together with its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilesystemPath {
    path: PathBuf,
    kind: PathKind,
}

impl FilesystemPath {
    /// Resolves `path` to an absolute path and classifies it.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = std::path::absolute(path.as_ref())?;
        let kind = PathKind::of(&path);
        Ok(Self { path, kind })
    }

    /// Returns the absolute path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the kind recorded at resolution time.
    pub fn kind(&self) -> PathKind {
        self.kind
    }

    /// Returns true if the path is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == PathKind::Directory
    }

    /// Returns true if the path is a file.
    pub fn is_file(&self) -> bool {
        self.kind == PathKind::File
    }

    /// Returns the final component as a string, if any.
    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// Removes a leading provider-style prefix from user input.
///
/// Only a prefix at the very start counts; `::` or `file://` later in the
/// path is left alone.
fn strip_provider_prefix(input: &str) -> &str {
    if let Some(rest) = input.strip_prefix(FILE_SCHEME) {
        return rest;
    }
    match input.split_once("::") {
        Some((provider, rest))
            if FILESYSTEM_PROVIDERS
                .iter()
                .any(|p| provider.eq_ignore_ascii_case(p)) =>
        {
            rest
        }
        _ => input,
    }
}

fn has_glob_chars(input: &str) -> bool {
    input.contains(GLOB_CHARS)
}

/// Resolves source paths for adding to an archive.
///
/// Unless `literal` is set, inputs containing `*`, `?` or `[` are expanded
/// as glob patterns. Duplicates are dropped, keeping the first occurrence.
///
/// # Errors
///
/// - [`Error::PathNotFound`] if an input (or pattern) matches nothing.
/// - [`Error::InvalidPattern`] if a pattern cannot be parsed.
pub fn resolve_sources<P: AsRef<Path>>(inputs: &[P], literal: bool) -> Result<Vec<FilesystemPath>> {
    let mut resolved: Vec<FilesystemPath> = Vec::new();

    for input in inputs {
        let raw = input.as_ref().to_string_lossy();
        let text = strip_provider_prefix(&raw);

        if !literal && has_glob_chars(text) {
            for path in expand_pattern(text)? {
                push_unique(&mut resolved, FilesystemPath::new(path)?);
            }
            continue;
        }

        let path = FilesystemPath::new(text)?;
        if path.kind() == PathKind::Missing {
            return Err(Error::PathNotFound {
                path: raw.into_owned(),
            });
        }
        push_unique(&mut resolved, path);
    }

    log::debug!("resolved {} source path(s)", resolved.len());
    Ok(resolved)
}

fn push_unique(resolved: &mut Vec<FilesystemPath>, path: FilesystemPath) {
    if !resolved.iter().any(|p| p.path == path.path) {
        resolved.push(path);
    }
}

/// Expands a glob pattern relative to the current directory.
fn expand_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let absolute = std::path::absolute(pattern)?;
    let absolute = absolute.to_string_lossy();

    let paths = glob::glob(&absolute).map_err(|e| Error::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => matches.push(path),
            Err(e) => log::warn!("skipping unreadable match for '{}': {}", pattern, e),
        }
    }

    if matches.is_empty() {
        return Err(Error::PathNotFound {
            path: pattern.to_string(),
        });
    }
    Ok(matches)
}

/// Validates the syntax shared by every destination-like input.
///
/// Destination-like inputs are never glob-expanded, so `*`, `?` and `[` are
/// ordinary file name characters here.
fn check_syntax(input: &str, raw: &str) -> Result<()> {
    let invalid = |reason| Error::InvalidDestination {
        path: raw.to_string(),
        reason,
    };

    if input.is_empty() {
        return Err(invalid("empty path"));
    }
    if input.contains('\0') {
        return Err(invalid("contains NUL byte"));
    }
    Ok(())
}

/// Resolves the path of an archive file to be written.
///
/// # Errors
///
/// Returns [`Error::InvalidDestination`] if the input is empty, contains NUL,
/// does not name a file, or names an existing directory.
pub fn resolve_destination(input: impl AsRef<Path>) -> Result<PathBuf> {
    let raw = input.as_ref().to_string_lossy();
    let text = strip_provider_prefix(&raw);
    check_syntax(text, &raw)?;

    let invalid = |reason| Error::InvalidDestination {
        path: raw.to_string(),
        reason,
    };

    if text.ends_with(std::path::MAIN_SEPARATOR) || text.ends_with('/') {
        return Err(invalid("path names a directory"));
    }

    let path = std::path::absolute(text)?;
    if path.file_name().is_none() || text.ends_with("..") {
        return Err(invalid("path has no file name"));
    }
    if path.is_dir() {
        return Err(invalid("path is an existing directory"));
    }

    Ok(path)
}

/// Resolves the path of an existing archive to read.
///
/// # Errors
///
/// Returns [`Error::InvalidDestination`] for syntactically invalid input and
/// [`Error::ArchiveNotFound`] if no file exists at the path.
pub fn resolve_archive(input: impl AsRef<Path>) -> Result<PathBuf> {
    let path = resolve_destination(input)?;
    if !path.is_file() {
        return Err(Error::ArchiveNotFound { path });
    }
    Ok(path)
}

/// Resolves an extraction target directory.
///
/// The directory does not need to exist yet.
///
/// # Errors
///
/// Returns [`Error::InvalidDestination`] if the input is empty or contains
/// NUL.
pub fn resolve_directory(input: impl AsRef<Path>) -> Result<PathBuf> {
    let raw = input.as_ref().to_string_lossy();
    let text = strip_provider_prefix(&raw);
    check_syntax(text, &raw)?;
    Ok(std::path::absolute(text)?)
}
