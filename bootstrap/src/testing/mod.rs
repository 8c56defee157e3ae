//! Testing utilities for the bootstrap pipeline.
//!
//! This module provides:
//! - A process runner that records invocations instead of spawning them
//! - A fake C toolchain that produces every artifact as a shell script

mod fixtures;
mod mocks;

#[cfg(unix)]
pub use fixtures::install_script;
pub use fixtures::FakeToolchain;
pub use mocks::RecordingRunner;
