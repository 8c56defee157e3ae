//! Error types for the bootstrap pipeline.
//!
//! Every failure is fatal to the run. Errors carry a [`Severity`] that the
//! top-level handler maps to an exit code and a message prefix.

use crate::observability::RunReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;

/// Exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit code for any fatal condition other than a usage error.
pub const EXIT_FAILURE: u8 = 1;

/// Exit code for configuration mistakes detected before any subprocess runs.
pub const EXIT_USAGE: u8 = 2;

/// How bad an error is, and where it was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The environment could not be resolved into a valid configuration.
    Usage,
    /// A system call made by the pipeline itself failed.
    Os,
    /// A spawned stage crashed or exited with a nonzero status.
    ChildFailure,
    /// The pipeline's own logic is broken.
    Internal,
}

impl Severity {
    /// Returns the process exit code for this severity.
    #[must_use]
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Usage => EXIT_USAGE,
            Self::Os | Self::ChildFailure | Self::Internal => EXIT_FAILURE,
        }
    }

    /// Returns the prefix used when reporting an error of this severity.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Usage => "usage error",
            Self::Os => "os error",
            Self::ChildFailure => "stage failed",
            Self::Internal => "internal error (this is a bug in bootstrap)",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The main error type for bootstrap operations.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Neither an override nor compile-time detection produced a value.
    #[error("unknown host {field}; specify it with {var}")]
    UnknownPlatform {
        /// The triple component that could not be determined.
        field: &'static str,
        /// The environment variable that would override it.
        var: &'static str,
    },

    /// An override variable is set to an unusable value.
    #[error("{var}={value:?} is invalid: {reason}")]
    InvalidOverride {
        /// The environment variable.
        var: &'static str,
        /// The offending value.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A system call needed by the pipeline itself failed.
    #[error("unable to {operation}: {}", describe_io(.source))]
    Os {
        /// What the pipeline was doing.
        operation: String,
        /// The underlying OS error.
        #[source]
        source: io::Error,
    },

    /// A child process could not be launched at all.
    #[error("unable to spawn {program}: {message}")]
    SpawnFailed {
        /// The executable that failed to launch.
        program: String,
        /// The OS error description, including its code when known.
        message: String,
    },

    /// A child process was terminated by a signal or crashed.
    #[error("{program}: child process crashed{}", signal_suffix(.signal))]
    AbnormalTermination {
        /// The program that crashed.
        program: String,
        /// The terminating signal, when the platform reports one.
        signal: Option<i32>,
    },

    /// A child process ran to completion with a nonzero status.
    #[error("{program} exited with code {code}")]
    NonZeroExit {
        /// The program that failed.
        program: String,
        /// Its exit code.
        code: i32,
    },

    /// An invariant of the pipeline itself was violated.
    #[error("{0}")]
    Internal(String),
}

impl BootstrapError {
    /// Creates an OS error for a failed pipeline operation.
    #[must_use]
    pub fn os(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Os {
            operation: operation.into(),
            source,
        }
    }

    /// Creates an internal invariant violation.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Returns the severity class of this error.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::UnknownPlatform { .. } | Self::InvalidOverride { .. } => Severity::Usage,
            Self::Os { .. } | Self::SpawnFailed { .. } => Severity::Os,
            Self::AbnormalTermination { .. } | Self::NonZeroExit { .. } => Severity::ChildFailure,
            Self::Internal(_) => Severity::Internal,
        }
    }

    /// Returns the process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        self.severity().exit_code()
    }

    /// Formats the one-line classified diagnostic.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        format!("{}: {}", self.severity(), self)
    }
}

/// A run that stopped at a failing stage, with the report gathered so far.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct DriverAbort {
    /// The error that stopped the run.
    #[source]
    pub error: BootstrapError,
    /// Stages attempted before the abort.
    pub report: Box<RunReport>,
}

impl DriverAbort {
    /// Wraps an error together with its partial report.
    #[must_use]
    pub fn new(error: BootstrapError, report: RunReport) -> Self {
        Self {
            error,
            report: Box::new(report),
        }
    }
}

/// Describes an OS error as `message (os error N)` regardless of platform formatting.
pub(crate) fn describe_io(err: &io::Error) -> String {
    match err.raw_os_error() {
        Some(code) if !err.to_string().contains("os error") => format!("{err} (os error {code})"),
        _ => err.to_string(),
    }
}

fn signal_suffix(signal: &Option<i32>) -> String {
    signal.map_or_else(String::new, |sig| format!(" (signal {sig})"))
}
