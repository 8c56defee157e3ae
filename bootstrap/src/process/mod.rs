//! Subprocess execution.
//!
//! This module provides:
//! - The [`BuildStage`] invocation record
//! - The [`StageResult`] classification of how a child ended
//! - The [`ProcessRunner`] trait and its OS-backed implementation

mod command;
mod result;
mod runner;

pub use command::BuildStage;
pub use result::{FailureKind, StageResult};
#[cfg(test)]
pub use runner::MockProcessRunner;
pub use runner::{ProcessRunner, SystemRunner};
