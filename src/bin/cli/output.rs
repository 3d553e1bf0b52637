//! Output formatting for CLI operations.

use serde_json::json;
use zipcraft::progress::format_bytes_iec;
use zipcraft::{ArchiveListing, ExtractResult, WriteOutcome};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the listings of one or more archives
    fn format_list(&self, listings: &[ArchiveListing], names_only: bool) -> String;

    /// Formats the outcome of `create` or `add`
    fn format_write_outcome(&self, outcome: &WriteOutcome) -> String;

    /// Formats extraction results
    fn format_extract_result(&self, result: &ExtractResult) -> String;
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, listings: &[ArchiveListing], names_only: bool) -> String {
        let mut output = String::new();

        if names_only {
            for entry in listings.iter().flat_map(|l| &l.entries) {
                output.push_str(&entry.name);
                output.push('\n');
            }
            return output;
        }

        for (i, listing) in listings.iter().enumerate() {
            if i > 0 {
                output.push('\n');
            }
            if listings.len() > 1 {
                output.push_str(&format!("{}:\n", listing.path.display()));
            }

            // Header
            output.push_str(&format!(
                "{:>12} {:>12} {:>6} {:>8} {}\n",
                "Size", "Packed", "Ratio", "Method", "Name"
            ));
            output.push_str(&"-".repeat(70));
            output.push('\n');

            for entry in &listing.entries {
                let (size, packed) = if entry.is_dir {
                    (String::new(), String::new())
                } else {
                    (
                        format_bytes_iec(entry.size),
                        format_bytes_iec(entry.compressed_size),
                    )
                };
                output.push_str(&format!(
                    "{:>12} {:>12} {:>5.0}% {:>8} {}\n",
                    size,
                    packed,
                    entry.ratio() * 100.0,
                    entry.method,
                    entry.name
                ));
            }

            // Footer
            output.push_str(&"-".repeat(70));
            output.push('\n');
            output.push_str(&format!(
                "{} entries, {} ({} packed), archive {}\n",
                listing.entries.len(),
                format_bytes_iec(listing.total_size()),
                format_bytes_iec(listing.total_compressed_size()),
                format_bytes_iec(listing.size)
            ));
        }

        output
    }

    fn format_write_outcome(&self, outcome: &WriteOutcome) -> String {
        let mut output = String::new();
        let result = &outcome.result;

        output.push_str(&format!(
            "{}: {} entries, {}\n",
            outcome.archive.path.display(),
            outcome.archive.entries,
            format_bytes_iec(outcome.archive.size)
        ));
        output.push_str(&format!(
            "Added {} files ({})\n",
            result.added.len(),
            format_bytes_iec(result.bytes_added())
        ));
        if result.replaced_count() > 0 {
            output.push_str(&format!("Replaced {} entries\n", result.replaced_count()));
        }
        if !result.excluded.is_empty() {
            output.push_str(&format!("Excluded {} files\n", result.excluded.len()));
        }
        if !result.conflicts.is_empty() {
            output.push_str(&format!(
                "Skipped {} existing entries (use --force to replace):\n",
                result.conflicts.len()
            ));
            for name in &result.conflicts {
                output.push_str(&format!("  {}\n", name));
            }
        }
        push_failures(&mut output, &result.failures);

        output
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Extracted {} files ({})\n",
            result.files.len(),
            format_bytes_iec(result.bytes_extracted())
        ));
        if !result.directories.is_empty() {
            output.push_str(&format!(
                "Created {} directories\n",
                result.directories.len()
            ));
        }
        if !result.conflicts.is_empty() {
            output.push_str(&format!(
                "Skipped {} existing files (use --force to overwrite):\n",
                result.conflicts.len()
            ));
            for name in &result.conflicts {
                output.push_str(&format!("  {}\n", name));
            }
        }
        push_failures(&mut output, &result.failures);

        output
    }
}

fn push_failures(output: &mut String, failures: &[(String, String)]) {
    if failures.is_empty() {
        return;
    }
    output.push_str("\nFailures:\n");
    for (item, error) in failures {
        output.push_str(&format!("  {}: {}\n", item, error));
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, listings: &[ArchiveListing], names_only: bool) -> String {
        let items: Vec<_> = listings
            .iter()
            .map(|listing| {
                let entries: Vec<_> = if names_only {
                    listing.entries.iter().map(|e| json!(e.name)).collect()
                } else {
                    listing
                        .entries
                        .iter()
                        .map(|e| {
                            json!({
                                "name": e.name,
                                "size": e.size,
                                "compressed_size": e.compressed_size,
                                "is_directory": e.is_dir,
                                "crc32": e.crc32,
                                "method": e.method,
                            })
                        })
                        .collect()
                };
                json!({
                    "archive": listing.path.display().to_string(),
                    "size": listing.size,
                    "entries": entries,
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_write_outcome(&self, outcome: &WriteOutcome) -> String {
        let result = &outcome.result;
        let obj = json!({
            "success": result.is_ok(),
            "archive": {
                "path": outcome.archive.path.display().to_string(),
                "size": outcome.archive.size,
                "entries": outcome.archive.entries,
            },
            "added": result.added.iter().map(|a| json!({
                "name": a.name,
                "source": a.source.display().to_string(),
                "size": a.size,
                "replaced": a.replaced,
            })).collect::<Vec<_>>(),
            "conflicts": result.conflicts,
            "excluded": result.excluded,
            "failures": result.failures.iter().map(|(p, e)| json!({"path": p, "error": e})).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_extract_result(&self, result: &ExtractResult) -> String {
        let obj = json!({
            "success": result.is_ok(),
            "files": result.files.iter().map(|f| json!({
                "name": f.name,
                "path": f.path.display().to_string(),
                "size": f.size,
            })).collect::<Vec<_>>(),
            "directories": result.directories.iter().map(|d| d.display().to_string()).collect::<Vec<_>>(),
            "bytes_extracted": result.bytes_extracted(),
            "conflicts": result.conflicts,
            "failures": result.failures.iter().map(|(p, e)| json!({"path": p, "error": e})).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}
