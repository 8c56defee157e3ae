//! Host triple resolution.

use super::{PlatformInfo, ToolchainFamily};
use crate::config::{EnvSnapshot, ABI_VAR, ARCH_VAR, OS_VAR, TRIPLE_VAR};
use crate::errors::BootstrapError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static COMPONENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.]+$").expect("component pattern is valid"));

static TRIPLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("triple pattern is valid"));

/// The `(architecture, operating system, ABI)` of the machine running the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostTriple {
    /// A triple assembled from its parts.
    Components {
        /// CPU architecture.
        arch: String,
        /// Operating system.
        os: String,
        /// ABI suffix including its leading dash, or empty.
        abi: String,
    },
    /// A triple given verbatim by `HOST_TARGET_TRIPLE`.
    Literal(String),
}

impl HostTriple {
    /// Assembles a triple from its parts.
    #[must_use]
    pub fn new(arch: impl Into<String>, os: impl Into<String>, abi: impl Into<String>) -> Self {
        Self::Components {
            arch: arch.into(),
            os: os.into(),
            abi: abi.into(),
        }
    }

    /// Returns the architecture, if the triple was assembled from parts.
    #[must_use]
    pub fn arch(&self) -> Option<&str> {
        match self {
            Self::Components { arch, .. } => Some(arch),
            Self::Literal(_) => None,
        }
    }

    /// Returns the operating system, if the triple was assembled from parts.
    #[must_use]
    pub fn os(&self) -> Option<&str> {
        match self {
            Self::Components { os, .. } => Some(os),
            Self::Literal(_) => None,
        }
    }

    /// Returns the ABI suffix, if the triple was assembled from parts.
    #[must_use]
    pub fn abi(&self) -> Option<&str> {
        match self {
            Self::Components { abi, .. } => Some(abi),
            Self::Literal(_) => None,
        }
    }
}

impl fmt::Display for HostTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Components { arch, os, abi } => write!(f, "{arch}-{os}{abi}"),
            Self::Literal(triple) => f.write_str(triple),
        }
    }
}

/// Resolves the host triple from overrides and compile-time detection.
#[derive(Debug, Clone, Copy)]
pub struct HostTripleResolver {
    platform: PlatformInfo,
}

impl HostTripleResolver {
    /// Creates a resolver that falls back to the given platform.
    #[must_use]
    pub fn new(platform: PlatformInfo) -> Self {
        Self { platform }
    }

    /// Resolves the triple.
    ///
    /// `HOST_TARGET_TRIPLE` supersedes everything. Otherwise each component
    /// comes from its override or from the platform; the ABI defaults to the
    /// marker required by `family`.
    ///
    /// # Errors
    ///
    /// Returns a usage error when an override is malformed, or when neither an
    /// override nor the platform supplies the architecture or OS.
    pub fn resolve(
        &self,
        env: &EnvSnapshot,
        family: ToolchainFamily,
    ) -> Result<HostTriple, BootstrapError> {
        if let Some(triple) = env.get(TRIPLE_VAR) {
            validate(TRIPLE_VAR, triple, &TRIPLE_RE)?;
            return Ok(HostTriple::Literal(triple.to_string()));
        }

        let arch = component(env, ARCH_VAR, self.platform.arch, "architecture")?;
        let os = component(env, OS_VAR, self.platform.os, "operating system")?;
        let abi = match env.get(ABI_VAR) {
            Some("") => String::new(),
            Some(abi) => {
                validate(ABI_VAR, abi, &TRIPLE_RE)?;
                abi.to_string()
            }
            None => family.abi_marker().to_string(),
        };

        Ok(HostTriple::Components { arch, os, abi })
    }
}

fn component(
    env: &EnvSnapshot,
    var: &'static str,
    detected: Option<&'static str>,
    field: &'static str,
) -> Result<String, BootstrapError> {
    match (env.get(var), detected) {
        (Some(value), _) => {
            validate(var, value, &COMPONENT_RE)?;
            Ok(value.to_string())
        }
        (None, Some(value)) => Ok(value.to_string()),
        (None, None) => Err(BootstrapError::UnknownPlatform { field, var }),
    }
}

fn validate(var: &'static str, value: &str, pattern: &Regex) -> Result<(), BootstrapError> {
    if value.is_empty() {
        return Err(BootstrapError::InvalidOverride {
            var,
            value: value.to_string(),
            reason: "value is empty",
        });
    }
    if !pattern.is_match(value) {
        return Err(BootstrapError::InvalidOverride {
            var,
            value: value.to_string(),
            reason: "contains characters not allowed in a target triple",
        });
    }
    Ok(())
}
