//! The five bootstrap phases and their statuses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step of the fixed bootstrap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Compile the bundled bytecode-to-C translator.
    BuildTranslator,
    /// Translate the bytecode seed into the stage-1 compiler's C source.
    TranslateSeed,
    /// Compile the stage-1 compiler natively.
    BuildStage1Compiler,
    /// Write the generated build-options source.
    EmitConfig,
    /// Use the stage-1 compiler to emit C for the real compiler, then build it.
    BuildStage2Compiler,
}

impl Phase {
    /// Every phase, in execution order.
    pub const ALL: [Self; 5] = [
        Self::BuildTranslator,
        Self::TranslateSeed,
        Self::BuildStage1Compiler,
        Self::EmitConfig,
        Self::BuildStage2Compiler,
    ];

    /// Position in the sequence, starting at 1.
    #[must_use]
    pub fn ordinal(self) -> usize {
        match self {
            Self::BuildTranslator => 1,
            Self::TranslateSeed => 2,
            Self::BuildStage1Compiler => 3,
            Self::EmitConfig => 4,
            Self::BuildStage2Compiler => 5,
        }
    }

    /// Short human-readable summary.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::BuildTranslator => "build the bytecode translator",
            Self::TranslateSeed => "translate the bytecode seed to C",
            Self::BuildStage1Compiler => "build the stage-1 compiler",
            Self::EmitConfig => "write the build configuration",
            Self::BuildStage2Compiler => "build the stage-2 compiler",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuildTranslator => write!(f, "build_translator"),
            Self::TranslateSeed => write!(f, "translate_seed"),
            Self::BuildStage1Compiler => write!(f, "build_stage1_compiler"),
            Self::EmitConfig => write!(f, "emit_config"),
            Self::BuildStage2Compiler => write!(f, "build_stage2_compiler"),
        }
    }
}

/// The execution status of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    /// Phase has not started.
    #[default]
    Pending,
    /// Phase is running.
    Running,
    /// Phase completed successfully.
    Ok,
    /// Phase failed; the run is aborted.
    Fail,
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Ok => write!(f, "ok"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

impl PhaseStatus {
    /// Returns true if the status represents a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ok | Self::Fail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_follow_execution_order() {
        let ordinals: Vec<usize> = Phase::ALL.iter().map(|p| p.ordinal()).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(Phase::EmitConfig.to_string(), "emit_config");
        assert_eq!(Phase::BuildStage1Compiler.to_string(), "build_stage1_compiler");
    }

    #[test]
    fn test_phase_serialize_matches_display() {
        for phase in Phase::ALL {
            let json = serde_json::to_string(&phase).unwrap();
            assert_eq!(json, format!("\"{phase}\""));
        }
    }

    #[test]
    fn test_status_is_terminal() {
        assert!(PhaseStatus::Ok.is_terminal());
        assert!(PhaseStatus::Fail.is_terminal());
        assert!(!PhaseStatus::Pending.is_terminal());
        assert!(!PhaseStatus::Running.is_terminal());
    }
}
