//! Fuzz target for entry name validation with arbitrary string input.
//!
//! Run with: cargo +nightly fuzz run entry_name
//!
//! Key security properties being tested:
//! - Path traversal rejection (../)
//! - Absolute name rejection
//! - NUL byte handling
//! - Extraction targets staying below the destination

#![no_main]

use libfuzzer_sys::fuzz_target;
fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(entry) = zipcraft::EntryName::new(name) {
        let normalized = entry.as_str();
        assert!(
            !normalized.split('/').any(|s| s == ".."),
            "Path traversal accepted: {:?}",
            normalized
        );
        assert!(
            !normalized.starts_with('/'),
            "Absolute name accepted: {:?}",
            normalized
        );
        assert!(
            !normalized.contains('\0'),
            "NUL byte in name: {:?}",
            normalized
        );
    }

    let root = std::env::temp_dir();
    let root = root.as_path();
    if let Ok(target) = zipcraft::validate_extract_path(name, root) {
        assert!(
            target.starts_with(root),
            "Target {:?} escaped {:?}",
            target,
            root
        );
    }
});
