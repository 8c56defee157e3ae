//! Fixed relative paths of every stage input and output.

use serde::{Deserialize, Serialize};

/// Where each stage reads its inputs and writes its outputs.
///
/// All paths are relative to the working directory. Executable names are
/// stored without a platform suffix; see [`StageLayout::executable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageLayout {
    /// C source of the bytecode-to-C translator.
    #[serde(default = "default_translator_source")]
    pub translator_source: String,
    /// Translator executable name.
    #[serde(default = "default_translator_exe")]
    pub translator_exe: String,
    /// The portable bytecode seed.
    #[serde(default = "default_seed")]
    pub seed: String,
    /// Translated stage-1 compiler C source.
    #[serde(default = "default_stage1_c")]
    pub stage1_c: String,
    /// Platform-support shim linked into the stage-1 compiler.
    #[serde(default = "default_support_shim")]
    pub support_shim: String,
    /// Stage-1 compiler executable name.
    #[serde(default = "default_stage1_exe")]
    pub stage1_exe: String,
    /// Generated build-options source.
    #[serde(default = "default_config_file")]
    pub config_file: String,
    /// Standard library directory handed to the stage-1 compiler.
    #[serde(default = "default_lib_dir")]
    pub lib_dir: String,
    /// Root module of the compiler.
    #[serde(default = "default_compiler_root")]
    pub compiler_root: String,
    /// Root module of the bundled C frontend dependency.
    #[serde(default = "default_aro_root")]
    pub aro_root: String,
    /// Root module of the runtime-support library.
    #[serde(default = "default_runtime_root")]
    pub runtime_root: String,
    /// Stage-2 compiler C output.
    #[serde(default = "default_stage2_c")]
    pub stage2_c: String,
    /// Runtime-support C output.
    #[serde(default = "default_runtime_c")]
    pub runtime_c: String,
    /// Include directory for the final native build.
    #[serde(default = "default_include_dir")]
    pub include_dir: String,
    /// Final compiler executable name.
    #[serde(default = "default_stage2_exe")]
    pub stage2_exe: String,
}

fn default_translator_source() -> String {
    "stage1/wasm2c.c".to_string()
}

fn default_translator_exe() -> String {
    "zig-wasm2c".to_string()
}

fn default_seed() -> String {
    "stage1/zig1.wasm".to_string()
}

fn default_stage1_c() -> String {
    "zig1.c".to_string()
}

fn default_support_shim() -> String {
    "stage1/wasi.c".to_string()
}

fn default_stage1_exe() -> String {
    "zig1".to_string()
}

fn default_config_file() -> String {
    "config.zig".to_string()
}

fn default_lib_dir() -> String {
    "lib".to_string()
}

fn default_compiler_root() -> String {
    "src/main.zig".to_string()
}

fn default_aro_root() -> String {
    "lib/compiler/aro/aro.zig".to_string()
}

fn default_runtime_root() -> String {
    "lib/compiler_rt.zig".to_string()
}

fn default_stage2_c() -> String {
    "zig2.c".to_string()
}

fn default_runtime_c() -> String {
    "compiler_rt.c".to_string()
}

fn default_include_dir() -> String {
    "stage1".to_string()
}

fn default_stage2_exe() -> String {
    "zig2".to_string()
}

impl Default for StageLayout {
    fn default() -> Self {
        Self {
            translator_source: default_translator_source(),
            translator_exe: default_translator_exe(),
            seed: default_seed(),
            stage1_c: default_stage1_c(),
            support_shim: default_support_shim(),
            stage1_exe: default_stage1_exe(),
            config_file: default_config_file(),
            lib_dir: default_lib_dir(),
            compiler_root: default_compiler_root(),
            aro_root: default_aro_root(),
            runtime_root: default_runtime_root(),
            stage2_c: default_stage2_c(),
            runtime_c: default_runtime_c(),
            include_dir: default_include_dir(),
            stage2_exe: default_stage2_exe(),
        }
    }
}

impl StageLayout {
    /// Creates the default layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the host executable suffix to an executable name.
    #[must_use]
    pub fn executable(name: &str) -> String {
        format!("{name}{}", std::env::consts::EXE_SUFFIX)
    }

    /// Returns the command used to invoke an executable built in the working directory.
    #[must_use]
    pub fn local_command(name: &str) -> String {
        let exe = Self::executable(name);
        if cfg!(windows) {
            format!(".\\{exe}")
        } else {
            format!("./{exe}")
        }
    }

    /// Lists every artifact the pipeline produces, in production order.
    #[must_use]
    pub fn artifacts(&self) -> Vec<String> {
        vec![
            Self::executable(&self.translator_exe),
            self.stage1_c.clone(),
            Self::executable(&self.stage1_exe),
            self.config_file.clone(),
            self.stage2_c.clone(),
            self.runtime_c.clone(),
            Self::executable(&self.stage2_exe),
        ]
    }
}
