//! Error types for venv-update operations.
//!
//! This module defines [`VenvUpdateError`], the error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every fatal condition is a `VenvUpdateError` variant and bubbles up to
//!   the top-level runner, which alone decides whether to invalidate
//! - Version conflicts are not errors; the resolver logs them and moves on
//! - Use `anyhow::Error` (via `VenvUpdateError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for venv-update operations.
#[derive(Debug, Error)]
pub enum VenvUpdateError {
    /// A requirement line is neither a named requirement nor a URL/path.
    #[error("{path}:{line}: unrecognized requirement: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// A requirement file could not be read.
    #[error("Could not read requirements file {path}: {source}")]
    RequirementsFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A (transitively) required package is not installed.
    #[error("Unmet dependency: {requirement} (required by {required_by}) is not installed")]
    UnmetDependency {
        requirement: String,
        required_by: String,
    },

    /// The installer exited non-zero.
    #[error("Command failed with exit code {code}: {command}")]
    InstallerFailed { command: String, code: i32 },

    /// A child process could not be started at all.
    #[error("Could not run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The environment creator exited non-zero.
    #[error("Could not create environment at {path}: exit code {code:?}")]
    CreatorFailed { path: PathBuf, code: Option<i32> },

    /// The re-executed stage 2 process exited non-zero.
    #[error("Stage 2 exited with code {code}")]
    Stage2Failed { code: i32 },

    /// Stage 2 is not running inside the environment it was asked to update.
    #[error("Refusing to run stage 2: active environment is {active:?}, expected {expected}")]
    WrongEnvironment {
        expected: PathBuf,
        active: Option<PathBuf>,
    },

    /// The installer's report could not be understood.
    #[error("Invalid installer report at {path}: {message}")]
    InvalidReport { path: PathBuf, message: String },

    /// Interrupted by the user or a signal.
    #[error("Interrupted")]
    Interrupted,

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VenvUpdateError {
    /// Process exit code for this error.
    ///
    /// Installer and stage 2 failures propagate their own code; everything
    /// else, interrupts included, exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InstallerFailed { code, .. } | Self::Stage2Failed { code } if *code != 0 => *code,
            _ => 1,
        }
    }
}

/// Result type alias for venv-update operations.
pub type Result<T> = std::result::Result<T, VenvUpdateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_displays_location() {
        let err = VenvUpdateError::Parse {
            path: PathBuf::from("requirements.txt"),
            line: 3,
            message: "-w wat".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("requirements.txt:3"));
        assert!(msg.contains("-w wat"));
    }

    #[test]
    fn unmet_dependency_displays_requirement_and_parent() {
        let err = VenvUpdateError::UnmetDependency {
            requirement: "six>=1.0".into(),
            required_by: "mock".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("six>=1.0"));
        assert!(msg.contains("mock"));
    }

    #[test]
    fn installer_failure_propagates_code() {
        let err = VenvUpdateError::InstallerFailed {
            command: "pip install".into(),
            code: 3,
        };
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("pip install"));
    }

    #[test]
    fn stage2_failure_propagates_code() {
        assert_eq!(VenvUpdateError::Stage2Failed { code: 2 }.exit_code(), 2);
    }

    #[test]
    fn zero_code_never_reports_success() {
        let err = VenvUpdateError::InstallerFailed {
            command: "pip".into(),
            code: 0,
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn generic_failures_exit_with_one() {
        assert_eq!(VenvUpdateError::Interrupted.exit_code(), 1);
        let err = VenvUpdateError::Parse {
            path: PathBuf::from("r.txt"),
            line: 1,
            message: "x".into(),
        };
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: VenvUpdateError = io_err.into();
        assert!(matches!(err, VenvUpdateError::Io(_)));
    }
}
