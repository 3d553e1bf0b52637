//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zipcraft::{ArchiveHandle, EntryIndex, OpenMode};

/// Writes a file, creating its parent directories.
pub fn write(path: impl AsRef<Path>, content: &[u8]) {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    std::fs::write(path, content).expect("Failed to write file");
}

/// Builds the sample tree `D/{a.txt, b.txt, S/c.txt}` inside `root`.
///
/// Returns the path of `D`.
pub fn sample_tree(root: &Path) -> PathBuf {
    let d = root.join("D");
    write(d.join("a.txt"), b"alpha file\n");
    write(d.join("b.txt"), b"beta file, a little longer\n");
    write(d.join("S").join("c.txt"), b"gamma file in a subdirectory\n");
    d
}

/// Returns the entry names of an archive in stored order.
pub fn entry_names(archive: &Path) -> Vec<String> {
    ArchiveHandle::open(archive, OpenMode::Read)
        .expect("Failed to open archive")
        .entry_names()
}

/// Returns the entry names of an archive, sorted.
pub fn sorted_entry_names(archive: &Path) -> Vec<String> {
    let mut names = entry_names(archive);
    names.sort();
    names
}

/// Returns the size of a file in bytes.
pub fn file_size(path: &Path) -> u64 {
    std::fs::metadata(path).expect("Failed to stat file").len()
}

/// Reads every regular file below `root`, keyed by `/`-separated relative path.
pub fn read_tree(root: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut files = BTreeMap::new();
    for entry in WalkDir::new(root).min_depth(1) {
        let entry = entry.expect("Failed to walk tree");
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .expect("Walk escaped its root")
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        files.insert(
            relative,
            std::fs::read(entry.path()).expect("Failed to read file"),
        );
    }
    files
}

/// Writes a raw archive with the given (name, data) entries through the codec.
///
/// Used for archives whose names this crate would never produce itself.
pub fn write_raw_archive(path: &Path, entries: &[(&str, &str)]) {
    use std::io::Write;

    let file = std::fs::File::create(path).expect("Failed to create archive");
    let mut writer = zip::ZipWriter::new(file);
    for (name, data) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, zip::write::SimpleFileOptions::default())
                .expect("Failed to add directory");
        } else {
            writer
                .start_file(*name, zip::write::SimpleFileOptions::default())
                .expect("Failed to start entry");
            writer.write_all(data.as_bytes()).expect("Failed to write entry");
        }
    }
    writer.finish().expect("Failed to finish archive");
}
