//! Command implementations for the CLI tool.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use zipcraft::{AddOptions, CreateOptions, ExtractOptions, ExtractResult, WriteOutcome, ops};

use crate::exit_codes::{ExitCode, error_to_exit_code};
use crate::file_selector::FileSelector;
use crate::output::create_formatter;
use crate::progress::CliProgress;
use crate::{Level, OutputFormat};

/// Configuration for the create command.
pub struct CreateConfig<'a> {
    pub archive_path: &'a Path,
    pub paths: &'a [String],
    pub level: Level,
    pub force: bool,
    pub no_clobber: bool,
    pub literal: bool,
    pub exclude: &'a [String],
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Configuration for the add command.
pub struct AddConfig<'a> {
    pub archive_path: &'a Path,
    pub paths: &'a [String],
    pub level: Level,
    pub force: bool,
    pub literal: bool,
    pub exclude: &'a [String],
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Configuration for the extract command.
pub struct ExtractConfig<'a> {
    pub archive_path: &'a Path,
    pub output_dir: &'a Path,
    pub include: &'a [String],
    pub exclude: &'a [String],
    pub force: bool,
    pub format: OutputFormat,
    pub quiet: bool,
}

/// Create command implementation
pub fn create(config: &CreateConfig<'_>) -> ExitCode {
    let options = match CreateOptions::new()
        .compression(config.level.into())
        .force(config.force)
        .no_clobber(config.no_clobber)
        .literal(config.literal)
        .exclude(config.exclude)
    {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };

    let mut progress = CliProgress::new("Creating archive...", config.quiet);
    let outcome = ops::create_archive_with_progress(
        config.paths,
        config.archive_path,
        &options,
        &mut progress,
    );
    report_write(outcome, progress, config.format)
}

/// Add command implementation
pub fn add(config: &AddConfig<'_>) -> ExitCode {
    let options = match AddOptions::new()
        .compression(config.level.into())
        .overwrite(config.force)
        .literal(config.literal)
        .exclude(config.exclude)
    {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };

    let mut progress = CliProgress::new("Adding to archive...", config.quiet);
    let outcome = ops::add_to_archive_with_progress(
        config.paths,
        config.archive_path,
        &options,
        &mut progress,
    );
    report_write(outcome, progress, config.format)
}

/// List command implementation
pub fn list(archives: &[PathBuf], names_only: bool, format: OutputFormat) -> ExitCode {
    let formatter = create_formatter(format);

    let listings = match ops::list_entries(archives) {
        Ok(listings) => listings,
        Err(e) => {
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };

    print!("{}", formatter.format_list(&listings, names_only));
    ExitCode::Success
}

/// Extract command implementation
pub fn extract(config: &ExtractConfig<'_>) -> ExitCode {
    let selector = match FileSelector::new(config.include, config.exclude) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::BadArgs;
        }
    };
    let options = ExtractOptions::new().overwrite(config.force);
    let mut progress = CliProgress::new("Extracting...", config.quiet);

    let result = if selector.selects_all() {
        ops::expand_archive_with_progress(
            config.archive_path,
            config.output_dir,
            &options,
            &mut progress,
        )
    } else {
        let names = match ops::list_entries(&[config.archive_path]) {
            Ok(listings) => selector.filter(
                listings
                    .iter()
                    .flat_map(|l| &l.entries)
                    .map(|e| e.name.as_str()),
            ),
            Err(e) => {
                progress.finish_with_message("Failed");
                eprintln!("Error: {}", e);
                return error_to_exit_code(&e);
            }
        };
        ops::expand_entries_with_progress(
            config.archive_path,
            &names,
            config.output_dir,
            &options,
            &mut progress,
        )
    };

    report_extract(result, progress, config.format)
}

/// Extract-entry command implementation
pub fn extract_entry(
    archive_path: &Path,
    entries: &[String],
    output_dir: &Path,
    force: bool,
    format: OutputFormat,
    quiet: bool,
) -> ExitCode {
    let names = if entries == ["-"] {
        match read_names(std::io::stdin().lock()) {
            Ok(names) => names,
            Err(e) => {
                eprintln!("Error reading entry names: {}", e);
                return ExitCode::IoError;
            }
        }
    } else {
        entries.to_vec()
    };

    let options = ExtractOptions::new().overwrite(force);
    let mut progress = CliProgress::new("Extracting...", quiet);
    let result =
        ops::expand_entries_with_progress(archive_path, &names, output_dir, &options, &mut progress);
    report_extract(result, progress, format)
}

/// Reads one entry name per line, skipping blank lines.
fn read_names(reader: impl BufRead) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let name = line.trim_end_matches('\r');
        if !name.trim().is_empty() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

fn report_write(
    outcome: zipcraft::Result<WriteOutcome>,
    progress: CliProgress,
    format: OutputFormat,
) -> ExitCode {
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            progress.finish_with_message("Failed");
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };
    progress.finish();

    print!("{}", create_formatter(format).format_write_outcome(&outcome));
    let result = &outcome.result;
    ExitCode::from_warnings(result.has_warnings() || !result.is_ok())
}

fn report_extract(
    result: zipcraft::Result<ExtractResult>,
    progress: CliProgress,
    format: OutputFormat,
) -> ExitCode {
    let result = match result {
        Ok(result) => result,
        Err(e) => {
            progress.finish_with_message("Failed");
            eprintln!("Error: {}", e);
            return error_to_exit_code(&e);
        }
    };
    progress.finish();

    print!("{}", create_formatter(format).format_extract_result(&result));
    ExitCode::from_warnings(result.has_warnings() || !result.is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_names() {
        let input = "a.txt\r\n\nS/c.txt\n  \n";
        let names = read_names(input.as_bytes()).unwrap();
        assert_eq!(names, vec!["a.txt", "S/c.txt"]);
    }
}
