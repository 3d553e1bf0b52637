//! Extraction tests: conflict policy, selection and unsafe entry names.

mod common;

use tempfile::TempDir;
use zipcraft::{CreateOptions, Error, ExtractOptions, StatisticsProgress, ops};

use common::{read_tree, sample_tree, write, write_raw_archive};

#[test]
fn test_extract_into_missing_nested_destination() {
    let temp = TempDir::new().unwrap();
    let d = sample_tree(temp.path());
    let archive = temp.path().join("out.zip");
    ops::create_archive(&[&d], &archive, &CreateOptions::new()).unwrap();

    let dest = temp.path().join("x").join("y").join("z");
    let result = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();

    assert_eq!(result.files.len(), 3);
    assert_eq!(read_tree(&dest), read_tree(&d));
}

#[test]
fn test_existing_files_are_kept_without_force() {
    let temp = TempDir::new().unwrap();
    let d = sample_tree(temp.path());
    let archive = temp.path().join("out.zip");
    ops::create_archive(&[&d], &archive, &CreateOptions::new()).unwrap();
    let dest = temp.path().join("E");
    write(dest.join("a.txt"), b"local edit");

    let result = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();

    assert_eq!(result.conflicts, vec!["a.txt"]);
    assert_eq!(result.files.len(), 2);
    assert!(result.has_warnings());
    assert_eq!(std::fs::read(dest.join("a.txt")).unwrap(), b"local edit");
    assert!(dest.join("S").join("c.txt").is_file());
}

#[test]
fn test_force_overwrites_existing_files() {
    let temp = TempDir::new().unwrap();
    let d = sample_tree(temp.path());
    let archive = temp.path().join("out.zip");
    ops::create_archive(&[&d], &archive, &CreateOptions::new()).unwrap();
    let dest = temp.path().join("E");
    write(dest.join("a.txt"), b"local edit that is longer than the archived file");

    let options = ExtractOptions::new().overwrite(true);
    let result = ops::expand_archive(&archive, &dest, &options).unwrap();

    assert!(result.conflicts.is_empty());
    assert_eq!(read_tree(&dest), read_tree(&d));
}

#[test]
fn test_second_extraction_reports_every_file() {
    let temp = TempDir::new().unwrap();
    let d = sample_tree(temp.path());
    let archive = temp.path().join("out.zip");
    ops::create_archive(&[&d], &archive, &CreateOptions::new()).unwrap();
    let dest = temp.path().join("E");

    let first = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();
    let second = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();

    assert_eq!(first.files.len(), 3);
    assert!(second.files.is_empty());
    assert_eq!(second.conflicts.len(), 3);
}

#[test]
fn test_expand_selected_entries() {
    let temp = TempDir::new().unwrap();
    let d = sample_tree(temp.path());
    let archive = temp.path().join("out.zip");
    ops::create_archive(&[&d], &archive, &CreateOptions::new()).unwrap();
    let dest = temp.path().join("E");

    let result =
        ops::expand_entries(&archive, &["S/c.txt", "nope.txt"], &dest, &ExtractOptions::new())
            .unwrap();

    assert_eq!(result.files.len(), 1);
    assert_eq!(result.files[0].path, dest.join("S").join("c.txt"));
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].0, "nope.txt");
    assert!(!dest.join("a.txt").exists());
}

#[test]
fn test_traversal_entries_are_rejected() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("evil.zip");
    write_raw_archive(
        &archive,
        &[
            ("../evil.txt", "escaped"),
            ("ok/../../evil2.txt", "escaped"),
            ("safe.txt", "safe"),
        ],
    );
    let dest = temp.path().join("E");

    let result = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();

    assert_eq!(result.files.len(), 1);
    assert_eq!(result.failures.len(), 2);
    assert!(!temp.path().join("evil.txt").exists());
    assert!(!temp.path().join("evil2.txt").exists());
    assert_eq!(std::fs::read(dest.join("safe.txt")).unwrap(), b"safe");
}

#[test]
fn test_absolute_entry_is_rejected() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("evil.zip");
    write_raw_archive(&archive, &[("/abs.txt", "x"), ("\\win.txt", "x")]);
    let dest = temp.path().join("E");

    let result = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();

    assert!(result.files.is_empty());
    assert_eq!(result.failures.len(), 2);
}

#[test]
fn test_placeholders_and_backslash_names() {
    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("foreign.zip");
    write_raw_archive(
        &archive,
        &[
            ("docs/", ""),
            ("docs\\guide.txt", "guide"),
            ("empty/", ""),
        ],
    );
    let dest = temp.path().join("E");

    let result = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();

    assert!(result.is_ok(), "{:?}", result.failures);
    assert_eq!(result.directories.len(), 2);
    assert!(dest.join("empty").is_dir());
    assert_eq!(
        std::fs::read(dest.join("docs").join("guide.txt")).unwrap(),
        b"guide"
    );
}

#[test]
fn test_progress_sees_every_entry() {
    let temp = TempDir::new().unwrap();
    let d = sample_tree(temp.path());
    let archive = temp.path().join("out.zip");
    ops::create_archive(&[&d], &archive, &CreateOptions::new()).unwrap();

    let mut progress = StatisticsProgress::new();
    let result = ops::expand_archive_with_progress(
        &archive,
        temp.path().join("E"),
        &ExtractOptions::new(),
        &mut progress,
    )
    .unwrap();

    assert_eq!(progress.entries_total, Some(3));
    assert_eq!(progress.entries_processed, 3);
    assert_eq!(progress.bytes_processed, result.bytes_extracted());
}

#[test]
fn test_missing_archive_is_fatal() {
    let temp = TempDir::new().unwrap();
    let dest = temp.path().join("E");

    let err = ops::expand_archive(temp.path().join("missing.zip"), &dest, &ExtractOptions::new())
        .unwrap_err();

    assert!(matches!(err, Error::ArchiveNotFound { .. }));
    assert!(!dest.exists());
}

#[test]
fn test_destination_with_glob_characters() {
    let temp = TempDir::new().unwrap();
    let d = sample_tree(temp.path());
    let archive = temp.path().join("out.zip");
    ops::create_archive(&[&d], &archive, &CreateOptions::new()).unwrap();

    let dest = temp.path().join("E*").join("[v1]");
    let result = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();

    assert!(result.is_ok(), "{:?}", result.failures);
    assert_eq!(read_tree(&dest), read_tree(&d));
}

#[cfg(unix)]
#[test]
fn test_symlink_target_is_a_conflict_without_force() {
    let temp = TempDir::new().unwrap();
    let d = sample_tree(temp.path());
    let archive = temp.path().join("out.zip");
    ops::create_archive(&[&d], &archive, &CreateOptions::new()).unwrap();
    let dest = temp.path().join("E");
    write(dest.join("keep.txt"), b"precious");
    std::os::unix::fs::symlink(dest.join("keep.txt"), dest.join("a.txt")).unwrap();

    let result = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();

    assert_eq!(result.conflicts, vec!["a.txt"]);
    assert_eq!(result.files.len(), 2);
    assert_eq!(std::fs::read(dest.join("keep.txt")).unwrap(), b"precious");
}

#[cfg(unix)]
#[test]
fn test_dangling_symlink_never_writes_outside() {
    let temp = TempDir::new().unwrap();
    let d = sample_tree(temp.path());
    let archive = temp.path().join("out.zip");
    ops::create_archive(&[&d], &archive, &CreateOptions::new()).unwrap();
    let dest = temp.path().join("E");
    std::fs::create_dir(&dest).unwrap();
    let outside = temp.path().join("outside.txt");
    std::os::unix::fs::symlink(&outside, dest.join("a.txt")).unwrap();

    let result = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();
    assert_eq!(result.conflicts, vec!["a.txt"]);
    assert!(!outside.exists());

    let result = ops::expand_archive(&archive, &dest, &ExtractOptions::new().overwrite(true))
        .unwrap();
    assert!(result.is_ok(), "{:?}", result.failures);
    assert!(!outside.exists());
    let meta = std::fs::symlink_metadata(dest.join("a.txt")).unwrap();
    assert!(meta.file_type().is_file());
    assert_eq!(std::fs::read(dest.join("a.txt")).unwrap(), b"alpha file\n");
}

#[test]
fn test_corrupt_entry_does_not_stop_batch() {
    use std::io::Write;

    let temp = TempDir::new().unwrap();
    let archive = temp.path().join("raw.zip");
    {
        let file = std::fs::File::create(&archive).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let stored = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (name, data) in [
            ("a.txt", "first entry"),
            ("b.txt", "MIDDLE-ENTRY-PAYLOAD"),
            ("c.txt", "last entry"),
        ] {
            writer.start_file(name, stored).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }
    let mut bytes = std::fs::read(&archive).unwrap();
    let payload = b"MIDDLE-ENTRY-PAYLOAD";
    let at = bytes
        .windows(payload.len())
        .position(|w| w == payload)
        .unwrap();
    bytes[at] = b'X';
    std::fs::write(&archive, &bytes).unwrap();

    let dest = temp.path().join("E");
    let result = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();

    let names: Vec<_> = result.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "c.txt"]);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].0, "b.txt");
    assert!(!dest.join("b.txt").exists());
    assert_eq!(std::fs::read(dest.join("c.txt")).unwrap(), b"last entry");
}

#[test]
fn test_blocked_directory_does_not_stop_batch() {
    let temp = TempDir::new().unwrap();
    let d = sample_tree(temp.path());
    let archive = temp.path().join("out.zip");
    ops::create_archive(&[&d], &archive, &CreateOptions::new()).unwrap();
    let dest = temp.path().join("E");
    write(dest.join("S"), b"a file where a directory belongs");

    let result = ops::expand_archive(&archive, &dest, &ExtractOptions::new()).unwrap();

    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].0, "S/c.txt");
    assert!(dest.join("S").is_file());
    assert_eq!(std::fs::read(dest.join("a.txt")).unwrap(), b"alpha file\n");
    assert!(dest.join("b.txt").is_file());
}
