//! Selection of the C compiler used for every native-compile stage.

use super::PlatformInfo;
use crate::config::{EnvSnapshot, CC_VAR};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The flag dialect a C compiler speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolchainFamily {
    /// `cl`-style compilers taking `/`-prefixed flags.
    MsvcLike,
    /// `cc`-style compilers taking `-`-prefixed flags.
    UnixLike,
}

impl ToolchainFamily {
    /// Classifies a compiler by the file stem of its program path.
    #[must_use]
    pub fn detect(program: &str) -> Self {
        let stem = Path::new(program)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(program)
            .to_ascii_lowercase();
        match stem.as_str() {
            "cl" | "clang-cl" => Self::MsvcLike,
            _ => Self::UnixLike,
        }
    }

    /// The ABI suffix this family requires in the host triple.
    #[must_use]
    pub fn abi_marker(self) -> &'static str {
        match self {
            Self::MsvcLike => "-msvc",
            Self::UnixLike => "",
        }
    }
}

impl fmt::Display for ToolchainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MsvcLike => write!(f, "msvc-like"),
            Self::UnixLike => write!(f, "unix-like"),
        }
    }
}

/// The C compiler chosen for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainChoice {
    /// The program to invoke.
    pub program: String,
    /// Its flag dialect.
    pub family: ToolchainFamily,
    /// Whether the program came from `CC`.
    pub from_env: bool,
}

impl ToolchainChoice {
    /// Creates a choice for an explicit program.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        let program = program.into();
        Self {
            family: ToolchainFamily::detect(&program),
            program,
            from_env: false,
        }
    }
}

impl fmt::Display for ToolchainChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.program, self.family)
    }
}

/// Picks the C compiler from `CC` or a platform default.
#[derive(Debug, Clone, Copy)]
pub struct ToolchainSelector {
    platform: PlatformInfo,
}

impl ToolchainSelector {
    /// Creates a selector for the given platform.
    #[must_use]
    pub fn new(platform: PlatformInfo) -> Self {
        Self { platform }
    }

    /// The compiler used when `CC` is unset.
    #[must_use]
    pub fn default_program(&self) -> &'static str {
        if self.platform.is_msvc_env() {
            "cl"
        } else {
            "cc"
        }
    }

    /// Selects the compiler. Never fails; a bad choice surfaces when the
    /// first stage runs.
    #[must_use]
    pub fn select(&self, env: &EnvSnapshot) -> ToolchainChoice {
        match env.get(CC_VAR).filter(|cc| !cc.is_empty()) {
            Some(cc) => ToolchainChoice {
                from_env: true,
                ..ToolchainChoice::new(cc)
            },
            None => ToolchainChoice::new(self.default_program()),
        }
    }
}
