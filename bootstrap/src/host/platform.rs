//! Compile-time identification of the machine running the pipeline.

/// The platform this binary was compiled for.
///
/// `None` for a component means the platform is not one the pipeline
/// recognizes; resolution then requires an explicit override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformInfo {
    /// CPU architecture, spelled the way the target compiler expects.
    pub arch: Option<&'static str>,
    /// Operating system family.
    pub os: Option<&'static str>,
    /// The Rust target environment (`gnu`, `msvc`, `musl`, ...), possibly empty.
    pub env: &'static str,
}

impl PlatformInfo {
    /// Describes the platform this binary was built for.
    #[must_use]
    pub fn native() -> Self {
        Self {
            arch: native_arch(),
            os: native_os(),
            env: native_env(),
        }
    }

    /// Describes a platform explicitly.
    #[must_use]
    pub const fn new(arch: Option<&'static str>, os: Option<&'static str>, env: &'static str) -> Self {
        Self { arch, os, env }
    }

    /// A platform nothing is known about.
    #[must_use]
    pub const fn unknown() -> Self {
        Self::new(None, None, "")
    }

    /// Returns true on Apple operating systems.
    #[must_use]
    pub fn is_apple(&self) -> bool {
        matches!(self.os, Some("macos" | "ios"))
    }

    /// Returns true on Windows.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Some("windows")
    }

    /// Returns true when the default C toolchain is MSVC.
    #[must_use]
    pub fn is_msvc_env(&self) -> bool {
        self.is_windows() && self.env == "msvc"
    }
}

impl Default for PlatformInfo {
    fn default() -> Self {
        Self::native()
    }
}

fn native_arch() -> Option<&'static str> {
    if cfg!(target_arch = "x86_64") {
        Some("x86_64")
    } else if cfg!(target_arch = "x86") {
        Some("x86")
    } else if cfg!(target_arch = "aarch64") {
        Some("aarch64")
    } else if cfg!(target_arch = "arm") {
        Some("arm")
    } else if cfg!(target_arch = "riscv64") {
        Some("riscv64")
    } else if cfg!(all(target_arch = "powerpc64", target_endian = "little")) {
        Some("powerpc64le")
    } else if cfg!(target_arch = "powerpc64") {
        Some("powerpc64")
    } else if cfg!(target_arch = "s390x") {
        Some("s390x")
    } else if cfg!(target_arch = "loongarch64") {
        Some("loongarch64")
    } else if cfg!(target_arch = "sparc64") {
        Some("sparc64")
    } else {
        None
    }
}

fn native_env() -> &'static str {
    if cfg!(target_env = "msvc") {
        "msvc"
    } else if cfg!(target_env = "gnu") {
        "gnu"
    } else if cfg!(target_env = "musl") {
        "musl"
    } else {
        ""
    }
}

fn native_os() -> Option<&'static str> {
    match std::env::consts::OS {
        "windows" => Some("windows"),
        "macos" => Some("macos"),
        "linux" | "android" => Some("linux"),
        "freebsd" => Some("freebsd"),
        "netbsd" => Some("netbsd"),
        "openbsd" => Some("openbsd"),
        "dragonfly" => Some("dragonfly"),
        "illumos" => Some("illumos"),
        "solaris" => Some("solaris"),
        "haiku" => Some("haiku"),
        _ => None,
    }
}
