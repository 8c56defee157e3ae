//! On-disk fixtures for end-to-end runs.

use crate::config::{EnvSnapshot, StageLayout, CC_VAR};
use std::io;
use std::path::{Path, PathBuf};

/// Writes an executable script at `path`.
///
/// The file is written by a child `sh`, so this process never holds a
/// writable descriptor to it. Executing a file that a concurrently forked
/// child still has open for writing fails with `ETXTBSY`.
///
/// # Errors
///
/// Returns an error if the shell cannot be spawned or fails.
#[cfg(unix)]
pub fn install_script(path: &Path, contents: &str) -> io::Result<()> {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let mut child = Command::new("sh")
        .arg("-c")
        .arg(r#"cat > "$0" && chmod 755 "$0""#)
        .arg(path)
        .stdin(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(contents.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!(
            "installing {} failed: {status}",
            path.display()
        )))
    }
}

/// Every executable the fake compiler builds behaves like this: it writes
/// each `-femit-bin=` target, and with exactly two arguments writes the
/// second one as a translation output.
const TOOL_SCRIPT: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    -femit-bin=*) echo "/* generated */" > "${arg#-femit-bin=}" || exit 1 ;;
  esac
done
if [ "$#" -eq 2 ]; then
  echo "/* translated from $1 */" > "$2" || exit 1
fi
exit 0
"#;

/// A stand-in C compiler built from shell scripts.
///
/// The compiler reads `-o OUT`, refuses outputs named with
/// [`FakeToolchain::failing_on`], and otherwise installs a tool script at
/// `OUT`. Point a run at it through [`FakeToolchain::env`].
#[derive(Debug, Clone)]
pub struct FakeToolchain {
    root: PathBuf,
    failing: Vec<String>,
}

impl FakeToolchain {
    /// Creates a toolchain rooted at the run's working directory.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            failing: Vec::new(),
        }
    }

    /// Makes the compiler exit with status 1 when asked to produce `output`.
    #[must_use]
    pub fn failing_on(mut self, output: impl Into<String>) -> Self {
        self.failing.push(output.into());
        self
    }

    /// Returns the working directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the absolute path of the fake compiler.
    #[must_use]
    pub fn cc_path(&self) -> PathBuf {
        self.root.join("toolchain").join("cc")
    }

    /// Returns an environment that selects the fake compiler.
    #[must_use]
    pub fn env(&self) -> EnvSnapshot {
        EnvSnapshot::new().with_var(CC_VAR, self.cc_path().display().to_string())
    }

    /// Renders the compiler script.
    #[must_use]
    pub fn cc_script(&self) -> String {
        let failing: Vec<String> = self.failing.iter().map(|f| format!("'{f}'")).collect();
        format!(
            r#"#!/bin/sh
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
if [ -z "$out" ]; then
  echo "fake cc: no output named" >&2
  exit 64
fi
for fail in {failing}; do
  if [ "$out" = "$fail" ]; then
    echo "fake cc: refusing to build $out" >&2
    exit 1
  fi
done
cat > "$out" <<'TOOL'
{TOOL_SCRIPT}TOOL
chmod 755 "$out"
"#,
            failing = failing.join(" "),
        )
    }

    /// Writes the compiler and the stage inputs named by `layout`.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written.
    #[cfg(unix)]
    pub fn install(&self, layout: &StageLayout) -> io::Result<()> {
        std::fs::create_dir_all(self.root.join("toolchain"))?;
        install_script(&self.cc_path(), &self.cc_script())?;

        std::fs::create_dir_all(self.root.join(&layout.lib_dir))?;
        for input in [
            &layout.translator_source,
            &layout.seed,
            &layout.support_shim,
            &layout.compiler_root,
            &layout.aro_root,
            &layout.runtime_root,
        ] {
            let path = self.root.join(input);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, b"/* input */\n")?;
        }
        Ok(())
    }
}
