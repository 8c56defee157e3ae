//! Machine-readable record of a bootstrap run.

use crate::config::ResolvedConfig;
use crate::errors::{BootstrapError, Severity};
use crate::host::ToolchainFamily;
use crate::pipeline::{Phase, PhaseStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use uuid::Uuid;

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Phases are still executing.
    #[default]
    Running,
    /// Every phase completed.
    Success,
    /// A phase failed and the remaining phases were skipped.
    Aborted,
}

/// Size and digest of a file a phase produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Path relative to the working directory.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Lowercase hex SHA-256 of the contents.
    pub sha256: String,
}

impl ArtifactRecord {
    /// Reads `relative` under `work_dir` and fingerprints it.
    ///
    /// # Errors
    ///
    /// Returns an OS error if the file cannot be opened or read.
    pub fn capture(work_dir: &Path, relative: &str) -> Result<Self, BootstrapError> {
        let full = work_dir.join(relative);
        let mut file = File::open(&full)
            .map_err(|err| BootstrapError::os(format!("open {}", full.display()), err))?;

        let mut hasher = Sha256::new();
        let size = io::copy(&mut file, &mut hasher)
            .map_err(|err| BootstrapError::os(format!("read {}", full.display()), err))?;

        Ok(Self {
            path: relative.to_string(),
            size,
            sha256: hex::encode(hasher.finalize()),
        })
    }
}

/// What happened in one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseRecord {
    /// Position in the sequence, starting at 1.
    pub ordinal: usize,
    /// Which phase.
    pub phase: Phase,
    /// Current status.
    pub status: PhaseStatus,
    /// Rendered command lines, or the file write for config emission.
    pub commands: Vec<String>,
    /// When the phase started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration, once finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    /// Error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error class on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    /// Files produced, on success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactRecord>,
    #[serde(skip)]
    clock: Option<Instant>,
}

impl PhaseRecord {
    /// Starts a record for a phase that is about to run.
    #[must_use]
    pub fn start(phase: Phase, commands: Vec<String>) -> Self {
        Self {
            ordinal: phase.ordinal(),
            phase,
            status: PhaseStatus::Running,
            commands,
            started_at: Utc::now(),
            duration_ms: None,
            error: None,
            severity: None,
            artifacts: Vec::new(),
            clock: Some(Instant::now()),
        }
    }

    /// Milliseconds since [`PhaseRecord::start`]; zero for a deserialized record.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.clock
            .map_or(0.0, |clock| clock.elapsed().as_secs_f64() * 1000.0)
    }

    /// Marks the phase as completed and stops its clock.
    #[must_use]
    pub fn succeed(mut self) -> Self {
        self.status = PhaseStatus::Ok;
        self.duration_ms = Some(self.elapsed_ms());
        self
    }

    /// Attaches the fingerprints of the files the phase produced.
    #[must_use]
    pub fn with_artifacts(mut self, artifacts: Vec<ArtifactRecord>) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Marks the phase as failed and stops its clock.
    #[must_use]
    pub fn fail(mut self, error: &BootstrapError) -> Self {
        self.status = PhaseStatus::Fail;
        self.duration_ms = Some(self.elapsed_ms());
        self.error = Some(error.to_string());
        self.severity = Some(error.severity());
        self
    }
}

/// The full record of a run, written with `--report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// Host triple the stage-2 compiler was generated for.
    pub triple: String,
    /// C compiler used for native builds.
    pub toolchain: String,
    /// Flag dialect of that compiler.
    pub toolchain_family: ToolchainFamily,
    /// Working directory of the run.
    pub work_dir: PathBuf,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Overall outcome.
    pub status: RunStatus,
    /// One record per phase attempted, in order.
    pub phases: Vec<PhaseRecord>,
}

impl RunReport {
    /// Starts a report for a resolved configuration.
    #[must_use]
    pub fn new(resolved: &ResolvedConfig) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            triple: resolved.triple.to_string(),
            toolchain: resolved.toolchain.program.clone(),
            toolchain_family: resolved.toolchain.family,
            work_dir: resolved.work_dir().to_path_buf(),
            started_at: Utc::now(),
            ended_at: None,
            status: RunStatus::Running,
            phases: Vec::new(),
        }
    }

    /// Appends a finished phase record.
    pub fn push(&mut self, record: PhaseRecord) {
        self.phases.push(record);
    }

    /// Stamps the end time and final status.
    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.ended_at = Some(Utc::now());
    }

    /// Returns the record for a phase, if it was attempted.
    #[must_use]
    pub fn phase(&self, phase: Phase) -> Option<&PhaseRecord> {
        self.phases.iter().find(|record| record.phase == phase)
    }

    /// Returns the failed phase, if any.
    #[must_use]
    pub fn failed_phase(&self) -> Option<&PhaseRecord> {
        self.phases
            .iter()
            .find(|record| record.status == PhaseStatus::Fail)
    }

    /// Serializes as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BootstrapConfig, EnvSnapshot};
    use crate::host::PlatformInfo;
    use pretty_assertions::assert_eq;

    fn resolved() -> ResolvedConfig {
        BootstrapConfig::new()
            .with_work_dir("/tmp/work")
            .resolve(
                &EnvSnapshot::new(),
                PlatformInfo::new(Some("aarch64"), Some("linux"), "gnu"),
            )
            .unwrap()
    }

    #[test]
    fn test_artifact_capture_hashes_contents() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("zig1.c"), b"abc").unwrap();

        let record = ArtifactRecord::capture(dir.path(), "zig1.c").unwrap();
        assert_eq!(record.size, 3);
        assert_eq!(
            record.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_artifact_capture_missing_file_is_os_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ArtifactRecord::capture(dir.path(), "zig2").unwrap_err();
        assert_eq!(err.severity(), Severity::Os);
    }

    #[test]
    fn test_phase_record_transitions() {
        let record = PhaseRecord::start(Phase::TranslateSeed, vec!["./zig-wasm2c a b".into()]);
        assert_eq!(record.ordinal, 2);
        assert_eq!(record.status, PhaseStatus::Running);

        let failed = record.fail(
            &BootstrapError::NonZeroExit {
                program: "./zig-wasm2c".into(),
                code: 3,
            },
        );
        assert_eq!(failed.status, PhaseStatus::Fail);
        assert_eq!(failed.severity, Some(Severity::ChildFailure));
        assert_eq!(failed.error.as_deref(), Some("./zig-wasm2c exited with code 3"));
    }

    #[test]
    fn test_phase_record_measures_duration() {
        let record = PhaseRecord::start(Phase::BuildTranslator, vec![]);
        std::thread::sleep(std::time::Duration::from_millis(10));
        let done = record.succeed();
        assert!(done.duration_ms.unwrap() >= 10.0);
    }

    #[test]
    fn test_deserialized_record_has_no_clock() {
        let record = PhaseRecord::start(Phase::EmitConfig, vec![]).succeed();
        let json = serde_json::to_string(&record).unwrap();
        let loaded: PhaseRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.elapsed_ms(), 0.0);
        assert_eq!(loaded.duration_ms, record.duration_ms);
    }

    #[test]
    fn test_report_json_shape() {
        let mut report = RunReport::new(&resolved());
        report.push(PhaseRecord::start(Phase::BuildTranslator, vec![]).succeed());
        report.finish(RunStatus::Success);

        let value: serde_json::Value = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["triple"], "aarch64-linux");
        assert_eq!(value["status"], "success");
        assert_eq!(value["toolchain_family"], "unix_like");
        assert_eq!(value["phases"][0]["phase"], "build_translator");
        assert_eq!(value["phases"][0]["status"], "ok");
        assert!(value["phases"][0].get("error").is_none());
    }

    #[test]
    fn test_failed_phase_lookup() {
        let mut report = RunReport::new(&resolved());
        report.push(PhaseRecord::start(Phase::BuildTranslator, vec![]).succeed());
        report.push(
            PhaseRecord::start(Phase::TranslateSeed, vec![])
                .fail(&BootstrapError::internal("boom")),
        );
        report.finish(RunStatus::Aborted);

        assert_eq!(report.failed_phase().map(|r| r.phase), Some(Phase::TranslateSeed));
        assert!(report.phase(Phase::EmitConfig).is_none());
        assert!(report.ended_at.is_some());
    }

    #[test]
    fn test_json_round_trips() {
        let report = RunReport::new(&resolved());
        let loaded: RunReport = serde_json::from_str(&report.to_json_pretty().unwrap()).unwrap();
        assert_eq!(loaded.run_id, report.run_id);
        assert_eq!(loaded.work_dir, PathBuf::from("/tmp/work"));
    }
}
