//! The staged bootstrap pipeline.
//!
//! This module provides:
//! - The fixed [`Phase`] sequence and per-phase status
//! - [`StagePlan`], the fully resolved command lines of a run
//! - [`StageDriver`], which executes the plan and stops at the first failure

mod driver;
mod phase;
mod plan;

pub use driver::StageDriver;
pub use phase::{Phase, PhaseStatus};
pub use plan::{
    FlagProfile, OptLevel, PhaseAction, PlannedPhase, StagePlan, STAGE1_STACK_BYTES,
    STAGE2_STACK_BYTES,
};
