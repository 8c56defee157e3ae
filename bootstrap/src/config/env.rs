//! Snapshot of the environment variables the pipeline consumes.

use std::collections::HashMap;

/// Overrides the C compiler used for every native-compile stage.
pub const CC_VAR: &str = "CC";
/// Overrides the detected host architecture.
pub const ARCH_VAR: &str = "HOST_TARGET_ARCH";
/// Overrides the detected host operating system.
pub const OS_VAR: &str = "HOST_TARGET_OS";
/// Overrides the host ABI suffix.
pub const ABI_VAR: &str = "HOST_TARGET_ABI";
/// Overrides the whole host triple.
pub const TRIPLE_VAR: &str = "HOST_TARGET_TRIPLE";

/// Every variable captured by [`EnvSnapshot::capture`].
pub const CONSUMED_VARS: [&str; 5] = [CC_VAR, ARCH_VAR, OS_VAR, ABI_VAR, TRIPLE_VAR];

/// An immutable view of the consumed environment variables.
///
/// Captured once at startup so that resolution never reads the process
/// environment again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the consumed variables from the current process environment.
    ///
    /// Variables whose values are not valid Unicode are treated as unset.
    #[must_use]
    pub fn capture() -> Self {
        CONSUMED_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok().map(|value| (*name, value)))
            .collect()
    }

    /// Sets a variable.
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Gets a variable's value.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Returns true if no variables are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
