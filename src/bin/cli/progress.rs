//! Progress bar implementation for CLI operations.

use indicatif::{ProgressBar, ProgressStyle};
use zipcraft::progress::ProgressReporter;

/// Progress display for CLI operations
pub struct CliProgress {
    overall: ProgressBar,
    quiet: bool,
}

impl CliProgress {
    /// Creates a spinner that turns into a bar once the entry count is known
    pub fn new(message: &str, quiet: bool) -> Self {
        let overall = if quiet {
            ProgressBar::hidden()
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {pos} entries {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(message.to_string());
            pb
        };

        Self { overall, quiet }
    }

    /// Finishes the progress display
    pub fn finish(&self) {
        self.overall.finish_and_clear();
    }

    /// Finishes with a custom message
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.overall.abandon_with_message(msg.into());
    }
}

impl ProgressReporter for CliProgress {
    fn on_total_entries(&mut self, total: usize) {
        if self.quiet {
            return;
        }
        self.overall.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
        );
        self.overall.set_length(total as u64);
    }

    fn on_entry_start(&mut self, entry_name: &str, _entry_size: u64) {
        if self.quiet {
            return;
        }

        // Truncate long names
        let display_name = match entry_name.char_indices().rev().nth(36) {
            Some((idx, _)) if entry_name.chars().count() > 40 => {
                format!("...{}", &entry_name[idx..])
            }
            _ => entry_name.to_string(),
        };
        self.overall.set_message(display_name);
    }

    fn on_entry_complete(&mut self, _entry_name: &str, _bytes: u64, _success: bool) {
        self.overall.inc(1);
    }

    fn on_warning(&mut self, message: &str) {
        if !self.quiet {
            self.overall.suspend(|| eprintln!("Warning: {}", message));
        }
    }
}
