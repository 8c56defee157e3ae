//! Observability utilities.

mod logging;
mod report;

pub use logging::{default_directive, init_logging, LogFormat, LOG_ENV_VAR};
pub use report::{ArtifactRecord, PhaseRecord, RunReport, RunStatus};
