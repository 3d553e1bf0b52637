//! Path validation for safe extraction.
//!
//! Entry names come from the archive and cannot be trusted: a name such as
//! `../../etc/passwd` or `/etc/passwd` would otherwise escape the
//! destination directory. Every target path is validated here before the
//! engine creates directories or writes files.

use std::path::{Path, PathBuf};

use crate::archive_path::entry_segments;
use crate::{Error, Result};

/// Validates an entry name and maps it below `dest_root`.
///
/// Both `/` and `\` separate segments. The name is rejected when it is
/// absolute, carries a drive prefix, contains NUL or a `..` segment, or when
/// an existing ancestor of the target resolves (through symlinks) outside the
/// destination. An empty name maps to `dest_root` itself.
///
/// # Errors
///
/// Returns [`Error::PathTraversal`] for unsafe names, or an I/O error if the
/// destination root cannot be canonicalized.
///
/// # Examples
///
/// ```rust
/// use zipcraft::safety::validate_extract_path;
///
/// let dest = std::env::temp_dir();
/// let target = validate_extract_path("docs/readme.txt", &dest).unwrap();
/// assert!(target.starts_with(&dest));
///
/// assert!(validate_extract_path("../escape.txt", &dest).is_err());
/// assert!(validate_extract_path("/etc/passwd", &dest).is_err());
/// ```
pub fn validate_extract_path(name: &str, dest_root: &Path) -> Result<PathBuf> {
    let traversal = || Error::PathTraversal {
        name: name.to_string(),
    };

    if name.starts_with(&['/', '\\'][..]) || name.contains('\0') {
        return Err(traversal());
    }

    let mut full_path = dest_root.to_path_buf();
    for (idx, segment) in entry_segments(name).enumerate() {
        if segment == ".." {
            return Err(traversal());
        }
        if segment == "." {
            continue;
        }
        if idx == 0 && is_drive_prefix(segment) {
            return Err(traversal());
        }
        full_path.push(segment);
    }

    ensure_within(&full_path, dest_root).map_err(|e| match e {
        Error::PathTraversal { .. } => traversal(),
        other => other,
    })?;

    Ok(full_path)
}

/// Returns true for segments like `C:` that name a Windows drive.
fn is_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Checks that the deepest existing ancestor of `full_path` stays inside `dest_root`.
///
/// Existence is tested without following symlinks, so a dangling link still
/// counts. A symlink in the final position is never followed by the writer,
/// so its parent is checked instead.
fn ensure_within(full_path: &Path, dest_root: &Path) -> Result<()> {
    let canonical_dest = dest_root.canonicalize()?;
    let escapes = || Error::PathTraversal {
        name: full_path.display().to_string(),
    };

    let mut ancestor = full_path;
    loop {
        match std::fs::symlink_metadata(ancestor) {
            Ok(meta)
                if !(meta.file_type().is_symlink()
                    && ancestor == full_path
                    && full_path != dest_root) =>
            {
                break;
            }
            _ => match ancestor.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => ancestor = parent,
                _ => return Ok(()),
            },
        }
    }

    // A dangling link inside the chain cannot be resolved.
    let canonical_ancestor = ancestor.canonicalize().map_err(|_| escapes())?;
    if !canonical_ancestor.starts_with(&canonical_dest) {
        return Err(escapes());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_simple_path() {
        let temp = TempDir::new().unwrap();
        let result = validate_extract_path("file.txt", temp.path()).unwrap();
        assert_eq!(result, temp.path().join("file.txt"));
    }

    #[test]
    fn test_nested_path() {
        let temp = TempDir::new().unwrap();
        let result = validate_extract_path("a/b/c.txt", temp.path()).unwrap();
        assert_eq!(result, temp.path().join("a").join("b").join("c.txt"));
    }

    #[test]
    fn test_legacy_separator() {
        let temp = TempDir::new().unwrap();
        let result = validate_extract_path("a\\b.txt", temp.path()).unwrap();
        assert_eq!(result, temp.path().join("a").join("b.txt"));
    }

    #[test]
    fn test_empty_name_maps_to_root() {
        let temp = TempDir::new().unwrap();
        let result = validate_extract_path("", temp.path()).unwrap();
        assert_eq!(result, temp.path());
    }

    #[test]
    fn test_traversal_rejected() {
        let temp = TempDir::new().unwrap();
        for bad in ["../x", "a/../../x", "a\\..\\x", "/etc/passwd", "\\x", "C:/x", "a\0b"] {
            let err = validate_extract_path(bad, temp.path()).unwrap_err();
            assert!(matches!(err, Error::PathTraversal { .. }), "{:?}", bad);
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_rejected() {
        let temp = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        std::fs::create_dir(&dest).unwrap();
        std::os::unix::fs::symlink(outside.path(), dest.join("link")).unwrap();

        let err = validate_extract_path("link/evil.txt", &dest).unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_link_in_chain_rejected() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        std::fs::create_dir(&dest).unwrap();
        std::os::unix::fs::symlink(temp.path().join("outside"), dest.join("gone")).unwrap();

        let err = validate_extract_path("gone/evil.txt", &dest).unwrap_err();
        assert!(matches!(err, Error::PathTraversal { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_final_symlink_checks_parent() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        std::fs::create_dir(&dest).unwrap();
        std::os::unix::fs::symlink(temp.path().join("outside.txt"), dest.join("a.txt")).unwrap();

        let target = validate_extract_path("a.txt", &dest).unwrap();
        assert_eq!(target, dest.join("a.txt"));
    }
}
