//! Error taxonomy, exit codes and structured error output.
//!
//! Each layer reports its own `thiserror` enum ([`ScanError`], [`HashError`],
//! [`DeleteError`]); [`SddError`] gathers them at the top so the binary can
//! map a failure to an [`ExitCode`] via its [`ErrorKind`].

use std::io;

use serde::Serialize;
use thiserror::Error;

use crate::actions::DeleteError;
use crate::scanner::{HashError, ScanError};

/// Exit codes for the sdd binary.
///
/// - 0: Success (completed normally, with or without duplicates)
/// - 1: General error (scan or hashing failure, unexpected failure)
/// - 2: Invalid input (bad root directories or options)
/// - 3: Partial success (some removals or links failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the run completed.
    Success = 0,
    /// General error: the run could not complete.
    GeneralError = 1,
    /// Invalid input: the run could not start.
    InvalidInput = 2,
    /// Partial success: some filesystem changes failed.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "SDD000",
            Self::GeneralError => "SDD001",
            Self::InvalidInput => "SDD002",
            Self::PartialSuccess => "SDD003",
        }
    }
}

/// Broad category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Roots or options were unusable before any work started.
    Setup,
    /// Walking a root failed.
    Scan,
    /// Reading a candidate file failed.
    Hash,
    /// Removing or linking a file failed.
    Deletion,
    /// Reading an answer or writing a report failed.
    Input,
}

impl ErrorKind {
    /// Exit code for a run that failed with this kind of error.
    #[must_use]
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Setup => ExitCode::InvalidInput,
            Self::Deletion => ExitCode::PartialSuccess,
            Self::Scan | Self::Hash | Self::Input => ExitCode::GeneralError,
        }
    }
}

/// Top-level error of a run.
#[derive(Debug, Error)]
pub enum SddError {
    /// No root directory was given.
    #[error("no directories given")]
    NoRoots,

    /// A root could not be used.
    #[error("invalid root: {0}")]
    InvalidRoot(#[source] ScanError),

    /// Walking a root failed.
    #[error("scan failed: {0}")]
    Scan(#[source] ScanError),

    /// Hashing a candidate failed.
    #[error("hashing failed: {0}")]
    Hash(#[from] HashError),

    /// Removing or linking files failed.
    #[error("{count} file(s) could not be removed or linked (first: {first})")]
    Deletion {
        /// Number of failed paths
        count: usize,
        /// The first failure
        #[source]
        first: DeleteError,
    },

    /// Prompting or reporting failed.
    #[error("terminal I/O failed: {0}")]
    Input(#[source] io::Error),
}

impl SddError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoRoots | Self::InvalidRoot(_) => ErrorKind::Setup,
            Self::Scan(_) => ErrorKind::Scan,
            Self::Hash(_) => ErrorKind::Hash,
            Self::Deletion { .. } => ErrorKind::Deletion,
            Self::Input(_) => ErrorKind::Input,
        }
    }

    /// Exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        self.kind().exit_code()
    }
}

impl From<ScanError> for SddError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::NotADirectory(_) => Self::InvalidRoot(err),
            _ => Self::Scan(err),
        }
    }
}

impl From<io::Error> for SddError {
    fn from(err: io::Error) -> Self {
        Self::Input(err)
    }
}

/// Exit code for any error reaching `main`.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    err.downcast_ref::<SddError>()
        .map_or(ExitCode::GeneralError, SddError::exit_code)
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "SDD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Error category, when known
    pub kind: Option<ErrorKind>,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            kind: err.downcast_ref::<SddError>().map(SddError::kind),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::InvalidInput.as_i32(), 2);
        assert_eq!(ExitCode::PartialSuccess.as_i32(), 3);
        assert_eq!(ExitCode::InvalidInput.code_prefix(), "SDD002");
    }

    #[test]
    fn test_scan_error_classification() {
        let setup: SddError = ScanError::NotADirectory(PathBuf::from("/etc/passwd")).into();
        assert_eq!(setup.kind(), ErrorKind::Setup);
        assert_eq!(setup.exit_code(), ExitCode::InvalidInput);

        let scan: SddError = ScanError::PermissionDenied(PathBuf::from("/root")).into();
        assert_eq!(scan.kind(), ErrorKind::Scan);
        assert_eq!(scan.exit_code(), ExitCode::GeneralError);
    }

    #[test]
    fn test_other_kinds() {
        let hash: SddError = HashError::NotFound(PathBuf::from("/gone")).into();
        assert_eq!(hash.kind(), ErrorKind::Hash);

        let input: SddError = io::Error::from(io::ErrorKind::UnexpectedEof).into();
        assert_eq!(input.kind(), ErrorKind::Input);

        let deletion = SddError::Deletion {
            count: 2,
            first: DeleteError::NotFound(PathBuf::from("/b")),
        };
        assert_eq!(deletion.exit_code(), ExitCode::PartialSuccess);
        assert!(deletion.to_string().contains("2 file(s)"));

        assert_eq!(SddError::NoRoots.kind(), ErrorKind::Setup);
    }

    #[test]
    fn test_exit_code_for_anyhow() {
        let err = anyhow::Error::new(SddError::NoRoots);
        assert_eq!(exit_code_for(&err), ExitCode::InvalidInput);

        let err = anyhow::anyhow!("something else");
        assert_eq!(exit_code_for(&err), ExitCode::GeneralError);
    }

    #[test]
    fn test_structured_error_json() {
        let err = anyhow::Error::new(SddError::Hash(HashError::WorkerPanicked));
        let structured = StructuredError::new(&err, exit_code_for(&err));
        let json = serde_json::to_value(&structured).unwrap();

        assert_eq!(json["code"], "SDD001");
        assert_eq!(json["exit_code"], 1);
        assert_eq!(json["kind"], "hash");
        assert!(json["message"].as_str().unwrap().contains("panicked"));
    }
}
