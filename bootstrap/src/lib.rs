//! # Bootstrap
//!
//! Builds a self-hosted compiler starting from nothing but a system C
//! compiler and a portable bytecode seed.
//!
//! The run is a fixed, linear sequence of five phases:
//!
//! - **Build translator**: compile the bundled bytecode-to-C translator
//! - **Translate seed**: turn the bytecode seed into the stage-1 compiler's C source
//! - **Build stage-1 compiler**: compile that source natively
//! - **Emit config**: write the build-options source file
//! - **Build stage-2 compiler**: have stage 1 emit C for the real compiler and
//!   its runtime library, then compile them natively
//!
//! Each phase consumes the artifacts of the previous ones, so the first
//! failure aborts the run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bootstrap::prelude::*;
//!
//! let resolved = BootstrapConfig::new()
//!     .with_work_dir("/path/to/source")
//!     .resolve(&EnvSnapshot::capture(), PlatformInfo::native())?;
//! let runner = SystemRunner::new(resolved.work_dir());
//! let report = StageDriver::new(resolved, runner).run()?;
//! println!("{}", report.triple);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, missing_docs, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod emitter;
pub mod errors;
pub mod host;
pub mod observability;
pub mod pipeline;
pub mod process;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{BootstrapConfig, EnvSnapshot, ResolvedConfig, StageLayout};
    pub use crate::emitter::{ConfigEmitter, MIN_CONFIG_BYTES};
    pub use crate::errors::{BootstrapError, DriverAbort, Severity};
    pub use crate::host::{
        HostTriple, HostTripleResolver, PlatformInfo, ToolchainChoice, ToolchainFamily,
        ToolchainSelector,
    };
    pub use crate::observability::{
        init_logging, ArtifactRecord, LogFormat, PhaseRecord, RunReport, RunStatus,
    };
    pub use crate::pipeline::{Phase, PhaseStatus, StageDriver, StagePlan};
    pub use crate::process::{BuildStage, FailureKind, ProcessRunner, StageResult, SystemRunner};
}
