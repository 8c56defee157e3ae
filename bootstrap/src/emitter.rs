//! Generation of the build-options source consumed by the stage-2 compile.

use crate::errors::BootstrapError;
use std::fs::File;
use std::io::{ErrorKind, Write};
use std::path::Path;

/// Fewer bytes than this can only come from a broken template or writer.
pub const MIN_CONFIG_BYTES: usize = 100;

/// Feature flags baked into every bootstrap build, in emission order.
const FEATURE_FLAGS: [(&str, bool); 10] = [
    ("enable_debug_extensions", false),
    ("enable_logging", false),
    ("enable_link_snapshots", false),
    ("enable_tracy", false),
    ("value_tracing", false),
    ("skip_non_native", false),
    ("only_c", false),
    ("force_gpa", false),
    ("only_core_functionality", true),
    ("only_reduce", false),
];

/// Backends that are never available to a bootstrapped compiler.
const LLVM_FLAGS: [&str; 5] = [
    "have_llvm",
    "llvm_has_m68k",
    "llvm_has_csky",
    "llvm_has_arc",
    "llvm_has_xtensa",
];

/// Writes the generated config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEmitter {
    version: String,
}

impl ConfigEmitter {
    /// Creates an emitter for the given version string.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    /// Returns the version string.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Renders the file contents.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for name in LLVM_FLAGS {
            out.push_str(&format!("pub const {name} = false;\n"));
        }
        out.push_str(&format!(
            "pub const version: [:0]const u8 = \"{}\";\n",
            escape(&self.version)
        ));
        out.push_str(
            "pub const semver = @import(\"std\").SemanticVersion.parse(version) catch unreachable;\n",
        );
        for (name, value) in FEATURE_FLAGS {
            out.push_str(&format!("pub const {name} = {value};\n"));
        }
        out
    }

    /// Writes the file at `path`, truncating any existing file.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an OS error if the file cannot be opened, written or closed,
    /// and an internal error if fewer bytes than expected were written.
    pub fn emit(&self, path: &Path) -> Result<usize, BootstrapError> {
        let mut file = File::create(path).map_err(|err| {
            BootstrapError::os(format!("open {} for writing", path.display()), err)
        })?;
        let written = self.write_to(&mut file)?;
        file.sync_all().map_err(|err| {
            BootstrapError::os(format!("finish writing {}", path.display()), err)
        })?;

        tracing::debug!(path = %path.display(), bytes = written, "Wrote config file");
        Ok(written)
    }

    /// Writes the rendered contents to `sink`.
    ///
    /// # Errors
    ///
    /// Returns an OS error if a write fails, and an internal error if the
    /// sink accepted fewer bytes than rendered or fewer than
    /// [`MIN_CONFIG_BYTES`].
    pub fn write_to<W: Write>(&self, sink: &mut W) -> Result<usize, BootstrapError> {
        let rendered = self.render();
        let bytes = rendered.as_bytes();

        let mut written = 0;
        while written < bytes.len() {
            match sink.write(&bytes[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => {}
                Err(err) => return Err(BootstrapError::os("write the config file", err)),
            }
        }
        sink.flush()
            .map_err(|err| BootstrapError::os("flush the config file", err))?;

        if written < MIN_CONFIG_BYTES {
            return Err(BootstrapError::internal(format!(
                "config file write produced only {written} bytes (expected at least {MIN_CONFIG_BYTES})"
            )));
        }
        if written != bytes.len() {
            return Err(BootstrapError::internal(format!(
                "config file write stopped after {written} of {} bytes",
                bytes.len()
            )));
        }
        Ok(written)
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
