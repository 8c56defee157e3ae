//! Classified outcome of a subprocess.

use crate::errors::BootstrapError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The failure class of a [`StageResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The process exited with status zero.
    None,
    /// The executable could not be launched.
    SpawnFailed,
    /// The process was killed by a signal or crashed.
    AbnormalTermination,
    /// The process exited with a nonzero status.
    NonZeroExit,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::SpawnFailed => write!(f, "spawn_failed"),
            Self::AbnormalTermination => write!(f, "abnormal_termination"),
            Self::NonZeroExit => write!(f, "non_zero_exit"),
        }
    }
}

/// How a subprocess ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageResult {
    /// Exit status zero.
    Success,
    /// The executable could not be launched.
    SpawnFailed {
        /// The OS error description.
        message: String,
        /// The raw OS error code, when available.
        os_code: Option<i32>,
    },
    /// Terminated by a signal or crash rather than a normal exit.
    AbnormalTermination {
        /// The terminating signal, on platforms that report one.
        signal: Option<i32>,
    },
    /// Ran to completion with a nonzero status.
    NonZeroExit {
        /// The exit status.
        code: i32,
    },
}

impl StageResult {
    /// Creates a spawn failure from an I/O error.
    #[must_use]
    pub fn spawn_failed(err: &std::io::Error) -> Self {
        Self::SpawnFailed {
            message: crate::errors::describe_io(err),
            os_code: err.raw_os_error(),
        }
    }

    /// Returns the failure class.
    #[must_use]
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Success => FailureKind::None,
            Self::SpawnFailed { .. } => FailureKind::SpawnFailed,
            Self::AbnormalTermination { .. } => FailureKind::AbnormalTermination,
            Self::NonZeroExit { .. } => FailureKind::NonZeroExit,
        }
    }

    /// Returns the exit code, if the process exited normally.
    #[must_use]
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Success => Some(0),
            Self::NonZeroExit { code } => Some(*code),
            Self::SpawnFailed { .. } | Self::AbnormalTermination { .. } => None,
        }
    }

    /// Returns true if the process exited with status zero.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// Converts a failure into the error that aborts the run.
    ///
    /// # Errors
    ///
    /// Returns the classified error for every outcome except success.
    pub fn into_result(self, program: &str) -> Result<(), BootstrapError> {
        let program = program.to_string();
        match self {
            Self::Success => Ok(()),
            Self::SpawnFailed { message, .. } => Err(BootstrapError::SpawnFailed { program, message }),
            Self::AbnormalTermination { signal } => {
                Err(BootstrapError::AbnormalTermination { program, signal })
            }
            Self::NonZeroExit { code } => Err(BootstrapError::NonZeroExit { program, code }),
        }
    }
}

impl fmt::Display for StageResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::SpawnFailed { message, .. } => write!(f, "spawn failed: {message}"),
            Self::AbnormalTermination { signal: Some(sig) } => write!(f, "crashed (signal {sig})"),
            Self::AbnormalTermination { signal: None } => write!(f, "crashed"),
            Self::NonZeroExit { code } => write!(f, "exited with code {code}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Severity;

    #[test]
    fn test_failure_kinds() {
        assert_eq!(StageResult::Success.failure_kind(), FailureKind::None);
        assert_eq!(
            StageResult::NonZeroExit { code: 2 }.failure_kind(),
            FailureKind::NonZeroExit
        );
        assert_eq!(
            StageResult::AbnormalTermination { signal: Some(6) }.failure_kind(),
            FailureKind::AbnormalTermination
        );
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(StageResult::Success.exit_code(), Some(0));
        assert_eq!(StageResult::NonZeroExit { code: 42 }.exit_code(), Some(42));
        assert_eq!(StageResult::AbnormalTermination { signal: None }.exit_code(), None);
    }

    #[test]
    fn test_into_result_severities() {
        assert!(StageResult::Success.into_result("cc").is_ok());

        let err = StageResult::NonZeroExit { code: 1 }.into_result("cc").unwrap_err();
        assert_eq!(err.severity(), Severity::ChildFailure);

        let err = StageResult::AbnormalTermination { signal: Some(11) }
            .into_result("./zig1")
            .unwrap_err();
        assert_eq!(err.severity(), Severity::ChildFailure);
        assert!(err.to_string().contains("child process crashed"));

        let spawn = StageResult::spawn_failed(&std::io::Error::from(std::io::ErrorKind::NotFound));
        let err = spawn.into_result("missing-cc").unwrap_err();
        assert_eq!(err.severity(), Severity::Os);
        assert!(err.to_string().contains("missing-cc"));
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(StageResult::NonZeroExit { code: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "non_zero_exit", "code": 3}));
    }
}
