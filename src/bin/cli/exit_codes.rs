//! Exit codes for the CLI tool.

use zipcraft::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Operation completed with warnings (conflicts or failed items)
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Archive format error
pub const BAD_ARCHIVE: i32 = 3;
/// I/O error
pub const IO_ERROR: i32 = 5;
/// Invalid command line arguments
pub const BAD_ARGS: i32 = 255;

/// Exit code enum for structured handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    Warning,
    FatalError,
    BadArchive,
    IoError,
    BadArgs,
}

impl ExitCode {
    /// Returns the numeric exit code
    pub fn code(self) -> i32 {
        match self {
            Self::Success => SUCCESS,
            Self::Warning => WARNING,
            Self::FatalError => FATAL_ERROR,
            Self::BadArchive => BAD_ARCHIVE,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }

    /// Success, or a warning if the operation skipped or lost items
    pub fn from_warnings(has_warnings: bool) -> Self {
        if has_warnings {
            Self::Warning
        } else {
            Self::Success
        }
    }
}

/// Converts a zipcraft error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) | Error::DirectoryCreateFailed { .. } => ExitCode::IoError,
        Error::Zip(_) => ExitCode::BadArchive,
        Error::InvalidDestination { .. }
        | Error::PathNotFound { .. }
        | Error::ArchiveNotFound { .. }
        | Error::InvalidPattern { .. }
        | Error::InvalidEntryName(_) => ExitCode::BadArgs,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
