//! Configuration for a bootstrap run.
//!
//! Environment variables are captured once into an [`EnvSnapshot`] and
//! resolved into an immutable [`ResolvedConfig`] before any stage runs.

mod env;
mod layout;

pub use env::{
    EnvSnapshot, ABI_VAR, ARCH_VAR, CC_VAR, CONSUMED_VARS, OS_VAR, TRIPLE_VAR,
};
pub use layout::StageLayout;

use crate::errors::BootstrapError;
use crate::host::{HostTriple, HostTripleResolver, PlatformInfo, ToolchainChoice, ToolchainSelector};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Version string written into the generated config file.
pub const DEFAULT_VERSION: &str = "0.14.0-dev.bootstrap";

/// Static settings for a bootstrap run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Directory every relative path is resolved against.
    #[serde(default = "default_work_dir")]
    pub work_dir: PathBuf,
    /// Version string for the generated config file.
    #[serde(default = "default_version")]
    pub version: String,
    /// Stage inputs and outputs.
    #[serde(default)]
    pub layout: StageLayout,
}

fn default_work_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_version() -> String {
    DEFAULT_VERSION.to_string()
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            work_dir: default_work_dir(),
            version: default_version(),
            layout: StageLayout::default(),
        }
    }
}

impl BootstrapConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the working directory.
    #[must_use]
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    /// Sets the version string.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Sets the stage layout.
    #[must_use]
    pub fn with_layout(mut self, layout: StageLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Resolves a path relative to the working directory.
    #[must_use]
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.work_dir.join(relative)
    }

    /// Selects the toolchain and resolves the host triple.
    ///
    /// # Errors
    ///
    /// Returns a usage error if the host triple cannot be resolved.
    pub fn resolve(
        self,
        env: &EnvSnapshot,
        platform: PlatformInfo,
    ) -> Result<ResolvedConfig, BootstrapError> {
        let toolchain = ToolchainSelector::new(platform).select(env);
        let triple = HostTripleResolver::new(platform).resolve(env, toolchain.family)?;

        tracing::debug!(
            triple = %triple,
            toolchain = %toolchain,
            work_dir = %self.work_dir.display(),
            "Resolved bootstrap configuration"
        );

        Ok(ResolvedConfig {
            config: self,
            platform,
            triple,
            toolchain,
        })
    }
}

/// Everything a run needs, fixed for its whole lifetime.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Static settings.
    pub config: BootstrapConfig,
    /// The platform the native builds run on.
    pub platform: PlatformInfo,
    /// The resolved host triple.
    pub triple: HostTriple,
    /// The selected C compiler.
    pub toolchain: ToolchainChoice,
}

impl ResolvedConfig {
    /// Builds a resolved configuration from explicit parts.
    #[must_use]
    pub fn new(
        config: BootstrapConfig,
        platform: PlatformInfo,
        triple: HostTriple,
        toolchain: ToolchainChoice,
    ) -> Self {
        Self {
            config,
            platform,
            triple,
            toolchain,
        }
    }

    /// Returns the stage layout.
    #[must_use]
    pub fn layout(&self) -> &StageLayout {
        &self.config.layout
    }

    /// Returns the working directory.
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.config.work_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ToolchainFamily;

    #[test]
    fn test_resolve_linux_defaults() {
        let platform = PlatformInfo::new(Some("x86_64"), Some("linux"), "gnu");
        let resolved = BootstrapConfig::new()
            .resolve(&EnvSnapshot::new(), platform)
            .unwrap();
        assert_eq!(resolved.triple.to_string(), "x86_64-linux");
        assert_eq!(resolved.toolchain.program, "cc");
        assert_eq!(resolved.config.version, DEFAULT_VERSION);
    }

    #[test]
    fn test_resolve_msvc_cc_sets_abi() {
        let platform = PlatformInfo::new(Some("x86_64"), Some("windows"), "gnu");
        let env = EnvSnapshot::new().with_var(CC_VAR, "cl");
        let resolved = BootstrapConfig::new().resolve(&env, platform).unwrap();
        assert_eq!(resolved.toolchain.family, ToolchainFamily::MsvcLike);
        assert_eq!(resolved.triple.to_string(), "x86_64-windows-msvc");
    }

    #[test]
    fn test_resolve_unknown_platform_fails() {
        let err = BootstrapConfig::new()
            .resolve(&EnvSnapshot::new(), PlatformInfo::unknown())
            .unwrap_err();
        assert_eq!(err.exit_code(), crate::errors::EXIT_USAGE);
    }

    #[test]
    fn test_path_joins_work_dir() {
        let config = BootstrapConfig::new().with_work_dir("/tmp/build");
        assert_eq!(config.path("zig1.c"), PathBuf::from("/tmp/build/zig1.c"));
    }

    #[test]
    fn test_config_deserialize_with_defaults() {
        let config: BootstrapConfig = serde_json::from_str(r#"{"version": "1.2.3"}"#).unwrap();
        assert_eq!(config.version, "1.2.3");
        assert_eq!(config.work_dir, PathBuf::from("."));
        assert_eq!(config.layout, StageLayout::default());
    }
}
