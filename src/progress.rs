//! Progress reporting for archive operations.
//!
//! The add and extract engines report each entry they handle through a
//! [`ProgressReporter`]. All callbacks have empty default implementations, so
//! a reporter only overrides what it displays.
//!
//! # Example
//!
//! ```rust
//! use zipcraft::progress::{ProgressReporter, StatisticsProgress};
//!
//! let mut progress = StatisticsProgress::new();
//! progress.on_entry_start("a.txt", 10);
//! progress.on_entry_complete("a.txt", 10, true);
//! assert_eq!(progress.entries_processed, 1);
//! assert_eq!(progress.bytes_processed, 10);
//! ```

/// IEC byte unit: 1 KiB = 1024 bytes.
pub const BYTES_KIB: u64 = 1024;
/// IEC byte unit: 1 MiB = 1024 KiB.
pub const BYTES_MIB: u64 = 1024 * BYTES_KIB;
/// IEC byte unit: 1 GiB = 1024 MiB.
pub const BYTES_GIB: u64 = 1024 * BYTES_MIB;

/// Progress callbacks for add and extract operations.
pub trait ProgressReporter {
    /// Called once before entries are processed, when the count is known.
    ///
    /// Adding walks directories lazily, so add operations do not call this.
    fn on_total_entries(&mut self, count: usize) {
        let _ = count;
    }

    /// Called when starting to process an entry.
    fn on_entry_start(&mut self, entry_name: &str, size: u64) {
        let _ = (entry_name, size);
    }

    /// Called when an entry is done, with the bytes written for it.
    fn on_entry_complete(&mut self, entry_name: &str, bytes: u64, success: bool) {
        let _ = (entry_name, bytes, success);
    }

    /// Called for conflicts and per-entry failures.
    fn on_warning(&mut self, message: &str) {
        let _ = message;
    }
}

impl<P: ProgressReporter + ?Sized> ProgressReporter for &mut P {
    fn on_total_entries(&mut self, count: usize) {
        (**self).on_total_entries(count);
    }

    fn on_entry_start(&mut self, entry_name: &str, size: u64) {
        (**self).on_entry_start(entry_name, size);
    }

    fn on_entry_complete(&mut self, entry_name: &str, bytes: u64, success: bool) {
        (**self).on_entry_complete(entry_name, bytes, success);
    }

    fn on_warning(&mut self, message: &str) {
        (**self).on_warning(message);
    }
}

/// A progress reporter that does nothing (null object pattern).
#[derive(Debug, Default, Clone)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {}

/// A progress reporter that collects statistics.
#[derive(Debug, Default, Clone)]
pub struct StatisticsProgress {
    /// Total entries announced, if known.
    pub entries_total: Option<usize>,
    /// Entries completed, successfully or not.
    pub entries_processed: usize,
    /// Entries that failed.
    pub entries_failed: usize,
    /// Bytes written for successful entries.
    pub bytes_processed: u64,
    /// Entry currently being processed.
    pub current_entry: Option<String>,
    /// Warnings collected.
    pub warnings: Vec<String>,
}

impl StatisticsProgress {
    /// Creates a new statistics progress reporter.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressReporter for StatisticsProgress {
    fn on_total_entries(&mut self, count: usize) {
        self.entries_total = Some(count);
    }

    fn on_entry_start(&mut self, entry_name: &str, _size: u64) {
        self.current_entry = Some(entry_name.to_string());
    }

    fn on_entry_complete(&mut self, _entry_name: &str, bytes: u64, success: bool) {
        self.entries_processed += 1;
        if success {
            self.bytes_processed += bytes;
        } else {
            self.entries_failed += 1;
        }
        self.current_entry = None;
    }

    fn on_warning(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }
}

/// Formats bytes as a human-readable string using IEC units.
pub fn format_bytes_iec(bytes: u64) -> String {
    let value = bytes as f64;
    if bytes >= BYTES_GIB {
        format!("{:.1} GiB", value / BYTES_GIB as f64)
    } else if bytes >= BYTES_MIB {
        format!("{:.1} MiB", value / BYTES_MIB as f64)
    } else if bytes >= BYTES_KIB {
        format!("{:.1} KiB", value / BYTES_KIB as f64)
    } else {
        format!("{} B", bytes)
    }
}
