//! Exit codes for the CLI tool.

use assetpack::Error;

/// Exit code constants
pub const SUCCESS: i32 = 0;
/// Edit refused, or check found dangling dependencies
pub const WARNING: i32 = 1;
/// Fatal error occurred
pub const FATAL_ERROR: i32 = 2;
/// Corrupt pack buffer
pub const BAD_ARCHIVE: i32 = 3;
/// Path not found or not a leaf
pub const NOT_FOUND: i32 = 4;
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
    NotFound,
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
            Self::NotFound => NOT_FOUND,
            Self::IoError => IO_ERROR,
            Self::BadArgs => BAD_ARGS,
        }
    }
}

/// Converts an assetpack error to an exit code
pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) => ExitCode::IoError,
        Error::CorruptArchive { .. } => ExitCode::BadArchive,
        Error::InvalidPath(_)
        | Error::InvalidName { .. }
        | Error::InvalidNodeType { .. }
        | Error::InvalidDependency(_) => ExitCode::BadArgs,
        Error::NodeNotFound { .. } | Error::NotALeaf { .. } => ExitCode::NotFound,
        Error::ResourceLimitExceeded(_) => ExitCode::FatalError,
        // Future error variants - required by #[non_exhaustive]
        _ => ExitCode::FatalError,
    }
}
