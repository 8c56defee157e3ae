//! Spawning subprocesses and classifying how they end.

use super::{BuildStage, StageResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Runs one invocation to completion and classifies the outcome.
///
/// Implementations block until the child terminates. There is no timeout
/// and no retry.
#[cfg_attr(test, mockall::automock)]
pub trait ProcessRunner {
    /// Runs the invocation.
    fn run(&self, stage: &BuildStage) -> StageResult;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn run(&self, stage: &BuildStage) -> StageResult {
        (**self).run(stage)
    }
}

/// Runs invocations as real child processes.
#[derive(Debug, Clone)]
pub struct SystemRunner {
    work_dir: PathBuf,
    echo: bool,
}

impl SystemRunner {
    /// Creates a runner whose children start in `work_dir`.
    ///
    /// A relative `work_dir` is made absolute against the current directory
    /// here, so program paths and the child's cwd agree.
    #[must_use]
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        let work_dir = work_dir.into();
        let work_dir = std::path::absolute(&work_dir).unwrap_or(work_dir);
        Self {
            work_dir,
            echo: true,
        }
    }

    /// Enables or disables echoing command lines to stderr.
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Returns the working directory of spawned children.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Relative program paths with a directory part name files in the
    /// working directory; bare names go through `PATH`.
    fn resolve_program(&self, program: &str) -> PathBuf {
        let path = Path::new(program);
        if path.is_relative() && path.components().count() > 1 {
            self.work_dir.join(path)
        } else {
            path.to_path_buf()
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, stage: &BuildStage) -> StageResult {
        if self.echo {
            // stderr is unbuffered; the line is visible before the child starts.
            let _ = writeln!(std::io::stderr().lock(), "{}", stage.command_line());
        }
        tracing::debug!(
            ordinal = stage.ordinal,
            program = stage.program(),
            args = ?stage.args(),
            "Spawning child process"
        );

        let status = Command::new(self.resolve_program(stage.program()))
            .args(stage.args())
            .current_dir(&self.work_dir)
            .status();

        match status {
            Ok(status) => classify(status),
            Err(err) => {
                tracing::debug!(error = %err, "Child process failed to spawn");
                StageResult::spawn_failed(&err)
            }
        }
    }
}

#[cfg(unix)]
fn classify(status: ExitStatus) -> StageResult {
    use std::os::unix::process::ExitStatusExt;

    match status.code() {
        Some(0) => StageResult::Success,
        Some(code) => StageResult::NonZeroExit { code },
        None => StageResult::AbnormalTermination {
            signal: status.signal(),
        },
    }
}

#[cfg(windows)]
fn classify(status: ExitStatus) -> StageResult {
    // Crashes surface as NTSTATUS error codes (severity bits 0b11).
    const NTSTATUS_ERROR: u32 = 0xC000_0000;

    match status.code() {
        Some(0) => StageResult::Success,
        #[allow(clippy::cast_sign_loss)]
        Some(code) if code as u32 >= NTSTATUS_ERROR => {
            StageResult::AbnormalTermination { signal: None }
        }
        Some(code) => StageResult::NonZeroExit { code },
        None => StageResult::AbnormalTermination { signal: None },
    }
}

#[cfg(not(any(unix, windows)))]
fn classify(status: ExitStatus) -> StageResult {
    match status.code() {
        Some(0) => StageResult::Success,
        Some(code) => StageResult::NonZeroExit { code },
        None => StageResult::AbnormalTermination { signal: None },
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::process::FailureKind;

    fn stage(argv: &[&str]) -> BuildStage {
        BuildStage::new(1, argv.iter().map(|s| (*s).to_string()).collect(), "test")
    }

    fn runner() -> SystemRunner {
        SystemRunner::new(".").with_echo(false)
    }

    #[test]
    fn test_success() {
        let result = runner().run(&stage(&["sh", "-c", "exit 0"]));
        assert_eq!(result, StageResult::Success);
    }

    #[test]
    fn test_nonexistent_executable_is_spawn_failure() {
        let result = runner().run(&stage(&["./definitely-not-here-4f1c"]));
        assert_eq!(result.failure_kind(), FailureKind::SpawnFailed);
        assert_ne!(result.failure_kind(), FailureKind::NonZeroExit);

        let result = runner().run(&stage(&["definitely-not-on-path-4f1c"]));
        assert_eq!(result.failure_kind(), FailureKind::SpawnFailed);
    }

    #[test]
    fn test_nonzero_exit_carries_code() {
        for code in [1, 3, 77, 255] {
            let script = format!("exit {code}");
            let result = runner().run(&stage(&["sh", "-c", &script]));
            assert_eq!(result, StageResult::NonZeroExit { code });
        }
    }

    #[test]
    fn test_signal_is_abnormal_termination() {
        let result = runner().run(&stage(&["sh", "-c", "kill -9 $$"]));
        assert_eq!(result, StageResult::AbnormalTermination { signal: Some(9) });
    }

    #[test]
    fn test_children_start_in_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = SystemRunner::new(dir.path()).with_echo(false);
        let result = runner.run(&stage(&["sh", "-c", "echo ok > marker.txt"]));
        assert!(result.is_success());
        assert!(dir.path().join("marker.txt").exists());
    }

    #[test]
    fn test_relative_program_resolves_against_work_dir() {
        let dir = tempfile::tempdir().unwrap();
        crate::testing::install_script(&dir.path().join("tool"), "#!/bin/sh\nexit 5\n").unwrap();

        let runner = SystemRunner::new(dir.path()).with_echo(false);
        let result = runner.run(&stage(&["./tool"]));
        assert_eq!(result, StageResult::NonZeroExit { code: 5 });
    }

    #[test]
    fn test_relative_work_dir_runs_local_program() {
        let dir = tempfile::tempdir_in(".").unwrap();
        crate::testing::install_script(&dir.path().join("tool"), "#!/bin/sh\nexit 5\n").unwrap();
        let relative = PathBuf::from(dir.path().file_name().unwrap());

        let runner = SystemRunner::new(&relative).with_echo(false);
        assert!(runner.work_dir().is_absolute());
        assert!(runner.work_dir().ends_with(&relative));

        let result = runner.run(&stage(&["./tool"]));
        assert_eq!(result, StageResult::NonZeroExit { code: 5 });
    }
}
