//! Fuzz target for listing and extracting arbitrary bytes as a ZIP archive.
//!
//! Run with: cargo +nightly fuzz run archive_open
//!
//! Whatever the input, listing and extraction must not panic and every file
//! written must stay inside the destination directory.

#![no_main]

use libfuzzer_sys::fuzz_target;
use zipcraft::{ExtractOptions, ops};

fuzz_target!(|data: &[u8]| {
    let Ok(temp) = tempfile::TempDir::new() else {
        return;
    };
    let archive = temp.path().join("input.zip");
    if std::fs::write(&archive, data).is_err() {
        return;
    }

    // We don't care about the result - we're looking for panics
    let _ = ops::list_entries(&[&archive]);

    let dest = temp.path().join("out");
    if let Ok(result) = ops::expand_archive(&archive, &dest, &ExtractOptions::new()) {
        let Ok(root) = dest.canonicalize() else {
            return;
        };
        for file in &result.files {
            let written = file.path.canonicalize().unwrap_or_else(|_| file.path.clone());
            assert!(
                written.starts_with(&root),
                "Entry {:?} escaped to {:?}",
                file.name,
                written
            );
        }
    }
});
