//! A single subprocess invocation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One subprocess invocation of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStage {
    /// Position of the invocation within the whole run, starting at 1.
    pub ordinal: usize,
    /// The argument vector; `argv[0]` is the executable.
    pub argv: Vec<String>,
    /// What the invocation does.
    pub description: String,
}

impl BuildStage {
    /// Creates a new invocation.
    #[must_use]
    pub fn new(ordinal: usize, argv: Vec<String>, description: impl Into<String>) -> Self {
        Self {
            ordinal,
            argv,
            description: description.into(),
        }
    }

    /// Returns the executable.
    #[must_use]
    pub fn program(&self) -> &str {
        self.argv.first().map_or("", String::as_str)
    }

    /// Returns the arguments after the executable.
    #[must_use]
    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }

    /// Renders the command line so it can be pasted into a shell.
    #[must_use]
    pub fn command_line(&self) -> String {
        self.argv
            .iter()
            .map(|arg| quote(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%\\".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(argv: &[&str]) -> BuildStage {
        BuildStage::new(1, argv.iter().map(|s| (*s).to_string()).collect(), "test")
    }

    #[test]
    fn test_program_and_args() {
        let s = stage(&["cc", "-o", "zig1", "zig1.c"]);
        assert_eq!(s.program(), "cc");
        assert_eq!(s.args(), ["-o", "zig1", "zig1.c"]);
    }

    #[test]
    fn test_empty_argv() {
        let s = stage(&[]);
        assert_eq!(s.program(), "");
        assert!(s.args().is_empty());
    }

    #[test]
    fn test_command_line_plain() {
        let s = stage(&["./zig1", "lib", "build-exe", "-femit-bin=zig2.c", "-Wl,-z,stack-size=0x10000000"]);
        assert_eq!(
            s.command_line(),
            "./zig1 lib build-exe -femit-bin=zig2.c -Wl,-z,stack-size=0x10000000"
        );
    }

    #[test]
    fn test_command_line_quotes_spaces_and_quotes() {
        let s = stage(&["my cc", "it's", ""]);
        assert_eq!(s.command_line(), r"'my cc' 'it'\''s' ''");
    }
}
