//! Sequential execution of the stage plan.

use super::{PhaseAction, PlannedPhase, StagePlan};
use crate::config::ResolvedConfig;
use crate::emitter::ConfigEmitter;
use crate::errors::{BootstrapError, DriverAbort};
use crate::observability::{ArtifactRecord, PhaseRecord, RunReport, RunStatus};
use crate::process::ProcessRunner;
use tracing::{error, info, warn};

/// Runs the five phases in order and stops at the first failure.
///
/// A phase starts only after every invocation of the previous phase has
/// exited successfully. Nothing is retried and nothing is cleaned up after a
/// failure; artifacts from completed phases stay on disk.
#[derive(Debug)]
pub struct StageDriver<R> {
    resolved: ResolvedConfig,
    plan: StagePlan,
    emitter: ConfigEmitter,
    runner: R,
}

impl<R: ProcessRunner> StageDriver<R> {
    /// Creates a driver for a resolved configuration.
    #[must_use]
    pub fn new(resolved: ResolvedConfig, runner: R) -> Self {
        let plan = StagePlan::new(&resolved);
        let emitter = ConfigEmitter::new(resolved.config.version.clone());
        Self {
            resolved,
            plan,
            emitter,
            runner,
        }
    }

    /// Replaces the config emitter.
    #[must_use]
    pub fn with_emitter(mut self, emitter: ConfigEmitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// Returns the plan this driver executes.
    #[must_use]
    pub fn plan(&self) -> &StagePlan {
        &self.plan
    }

    /// Returns the process runner.
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Executes every phase.
    ///
    /// # Errors
    ///
    /// Returns a [`DriverAbort`] holding the first error and the report of
    /// the phases attempted up to and including the failing one.
    pub fn run(&self) -> Result<RunReport, DriverAbort> {
        let mut report = RunReport::new(&self.resolved);
        info!(
            run_id = %report.run_id,
            triple = %report.triple,
            toolchain = %report.toolchain,
            "Starting bootstrap"
        );

        for planned in self.plan.phases() {
            let record = PhaseRecord::start(planned.phase, planned.command_lines());
            info!(
                ordinal = planned.phase.ordinal(),
                phase = %planned.phase,
                "Phase started: {}",
                planned.phase.description()
            );

            match self.execute(planned) {
                Ok(()) => {
                    let record = record.succeed();
                    info!(
                        ordinal = planned.phase.ordinal(),
                        phase = %planned.phase,
                        duration_ms = record.duration_ms,
                        "Phase completed"
                    );
                    let artifacts = self.fingerprint(planned);
                    report.push(record.with_artifacts(artifacts));
                }
                Err(err) => {
                    let record = record.fail(&err);
                    error!(
                        ordinal = planned.phase.ordinal(),
                        phase = %planned.phase,
                        duration_ms = record.duration_ms,
                        severity = %err.severity(),
                        error = %err,
                        "Phase failed"
                    );
                    report.push(record);
                    report.finish(RunStatus::Aborted);
                    return Err(DriverAbort::new(err, report));
                }
            }
        }

        report.finish(RunStatus::Success);
        info!(run_id = %report.run_id, "Bootstrap completed");
        Ok(report)
    }

    fn execute(&self, planned: &PlannedPhase) -> Result<(), BootstrapError> {
        match &planned.action {
            PhaseAction::Run(stages) => {
                for stage in stages {
                    self.runner.run(stage).into_result(stage.program())?;
                }
            }
            PhaseAction::EmitConfig { path } => {
                self.emitter.emit(path)?;
            }
        }
        Ok(())
    }

    fn fingerprint(&self, planned: &PlannedPhase) -> Vec<ArtifactRecord> {
        planned
            .outputs
            .iter()
            .filter_map(
                |output| match ArtifactRecord::capture(self.resolved.work_dir(), output) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        warn!(artifact = %output, error = %err, "Could not fingerprint artifact");
                        None
                    }
                },
            )
            .collect()
    }
}
