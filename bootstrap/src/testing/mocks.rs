//! In-memory process runners.

use crate::process::{BuildStage, ProcessRunner, StageResult};
use parking_lot::Mutex;
use std::collections::HashMap;

/// A runner that records every invocation and spawns nothing.
///
/// Every invocation succeeds unless an outcome was scripted for its ordinal
/// with [`RecordingRunner::fail_at`].
#[derive(Debug, Default)]
pub struct RecordingRunner {
    invocations: Mutex<Vec<BuildStage>>,
    outcomes: HashMap<usize, StageResult>,
}

impl RecordingRunner {
    /// Creates a runner where every invocation succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the outcome of the invocation with this ordinal.
    #[must_use]
    pub fn fail_at(mut self, ordinal: usize, result: StageResult) -> Self {
        self.outcomes.insert(ordinal, result);
        self
    }

    /// Returns all recorded invocations.
    #[must_use]
    pub fn invocations(&self) -> Vec<BuildStage> {
        self.invocations.lock().clone()
    }

    /// Returns the ordinals of recorded invocations, in order.
    #[must_use]
    pub fn ordinals(&self) -> Vec<usize> {
        self.invocations.lock().iter().map(|s| s.ordinal).collect()
    }

    /// Returns the number of recorded invocations.
    #[must_use]
    pub fn invocation_count(&self) -> usize {
        self.invocations.lock().len()
    }
}

impl ProcessRunner for RecordingRunner {
    fn run(&self, stage: &BuildStage) -> StageResult {
        self.invocations.lock().push(stage.clone());
        self.outcomes
            .get(&stage.ordinal)
            .cloned()
            .unwrap_or(StageResult::Success)
    }
}
