//! Host environment detection.
//!
//! This module provides:
//! - Compile-time platform identification
//! - C toolchain selection
//! - Host triple resolution with environment overrides

mod platform;
mod toolchain;
mod triple;

pub use platform::PlatformInfo;
pub use toolchain::{ToolchainChoice, ToolchainFamily, ToolchainSelector};
pub use triple::{HostTriple, HostTripleResolver};
