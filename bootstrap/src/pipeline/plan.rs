//! Construction of every stage's command line.

use super::Phase;
use crate::config::{ResolvedConfig, StageLayout};
use crate::host::{PlatformInfo, ToolchainFamily};
use crate::process::BuildStage;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Stack reserved for the stage-1 compiler.
pub const STAGE1_STACK_BYTES: u64 = 0x0100_0000;

/// Stack reserved for the stage-2 compiler, whose call graph is much deeper.
pub const STAGE2_STACK_BYTES: u64 = 0x1000_0000;

/// Optimization goal of a native compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptLevel {
    /// Optimize for speed.
    Speed,
    /// Optimize for size.
    Size,
}

/// Spells compiler flags for one toolchain family on one platform.
#[derive(Debug, Clone, Copy)]
pub struct FlagProfile {
    family: ToolchainFamily,
    platform: PlatformInfo,
}

impl FlagProfile {
    /// Creates a profile.
    #[must_use]
    pub fn new(family: ToolchainFamily, platform: PlatformInfo) -> Self {
        Self { family, platform }
    }

    /// Flags that name the output executable.
    #[must_use]
    pub fn output(&self, exe: &str) -> Vec<String> {
        match self.family {
            ToolchainFamily::MsvcLike => vec!["/nologo".to_string(), format!("/Fe{exe}")],
            ToolchainFamily::UnixLike => vec!["-o".to_string(), exe.to_string()],
        }
    }

    /// Language standard and optimization flags.
    #[must_use]
    pub fn codegen(&self, opt: OptLevel) -> Vec<String> {
        match (self.family, opt) {
            (ToolchainFamily::MsvcLike, OptLevel::Speed) => vec!["/O2".to_string()],
            (ToolchainFamily::MsvcLike, OptLevel::Size) => vec!["/Os".to_string()],
            (ToolchainFamily::UnixLike, OptLevel::Speed) => {
                vec!["-std=c99".to_string(), "-O2".to_string()]
            }
            (ToolchainFamily::UnixLike, OptLevel::Size) => {
                vec!["-std=c99".to_string(), "-Os".to_string()]
            }
        }
    }

    /// Adds an include directory.
    #[must_use]
    pub fn include(&self, dir: &str) -> String {
        match self.family {
            ToolchainFamily::MsvcLike => format!("/I{dir}"),
            ToolchainFamily::UnixLike => format!("-I{dir}"),
        }
    }

    /// Link-time flags: the math library, the stack reservation and, for the
    /// stage-2 build, threading support. MSVC linker flags must come last.
    #[must_use]
    pub fn link(&self, stack_bytes: u64, libm: bool, threads: bool) -> Vec<String> {
        match self.family {
            ToolchainFamily::MsvcLike => {
                vec!["/link".to_string(), format!("/STACK:{stack_bytes}")]
            }
            ToolchainFamily::UnixLike => {
                let mut flags = Vec::new();
                if libm {
                    flags.push("-lm".to_string());
                }
                flags.push(self.unix_stack_flag(stack_bytes));
                if threads && !self.platform.is_windows() {
                    flags.push("-pthread".to_string());
                }
                flags
            }
        }
    }

    fn unix_stack_flag(&self, stack_bytes: u64) -> String {
        if self.platform.is_apple() {
            format!("-Wl,-stack_size,{stack_bytes:#x}")
        } else if self.platform.is_windows() {
            format!("-Wl,--stack,{stack_bytes}")
        } else {
            format!("-Wl,-z,stack-size={stack_bytes:#x}")
        }
    }
}

/// What a phase does when it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhaseAction {
    /// Run these invocations in order.
    Run(Vec<BuildStage>),
    /// Write the generated config file to this path.
    EmitConfig {
        /// Destination, already joined with the working directory.
        path: PathBuf,
    },
}

/// A phase with its fully resolved action and expected outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPhase {
    /// Which phase.
    pub phase: Phase,
    /// What it does.
    pub action: PhaseAction,
    /// Files it produces, relative to the working directory.
    pub outputs: Vec<String>,
}

impl PlannedPhase {
    /// Returns the invocations of this phase; empty for config emission.
    #[must_use]
    pub fn invocations(&self) -> &[BuildStage] {
        match &self.action {
            PhaseAction::Run(stages) => stages,
            PhaseAction::EmitConfig { .. } => &[],
        }
    }

    /// Renders each command line, or a description of the file write.
    #[must_use]
    pub fn command_lines(&self) -> Vec<String> {
        match &self.action {
            PhaseAction::Run(stages) => stages.iter().map(BuildStage::command_line).collect(),
            PhaseAction::EmitConfig { path } => vec![format!("write {}", path.display())],
        }
    }
}

/// The complete, ordered plan of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    phases: Vec<PlannedPhase>,
}

impl StagePlan {
    /// Builds the plan for a resolved configuration.
    #[must_use]
    pub fn new(resolved: &ResolvedConfig) -> Self {
        let layout = resolved.layout();
        let cc = resolved.toolchain.program.as_str();
        let flags = FlagProfile::new(resolved.toolchain.family, resolved.platform);
        let triple = resolved.triple.to_string();

        let translator_exe = StageLayout::executable(&layout.translator_exe);
        let stage1_exe = StageLayout::executable(&layout.stage1_exe);
        let stage2_exe = StageLayout::executable(&layout.stage2_exe);
        let stage1_cmd = StageLayout::local_command(&layout.stage1_exe);

        let build_translator = native(
            cc,
            flags.output(&translator_exe),
            &[layout.translator_source.as_str()],
            flags.codegen(OptLevel::Speed),
        );

        let translate_seed = vec![
            StageLayout::local_command(&layout.translator_exe),
            layout.seed.clone(),
            layout.stage1_c.clone(),
        ];

        let mut build_stage1 = native(
            cc,
            flags.output(&stage1_exe),
            &[layout.stage1_c.as_str(), layout.support_shim.as_str()],
            flags.codegen(OptLevel::Size),
        );
        build_stage1.extend(flags.link(STAGE1_STACK_BYTES, true, false));

        let emit_stage2_c = strings(&[
            &stage1_cmd,
            &layout.lib_dir,
            "build-exe",
            "-ofmt=c",
            "-lc",
            "-OReleaseSmall",
            "--name",
            &layout.stage2_exe,
            &format!("-femit-bin={}", layout.stage2_c),
            "-target",
            &triple,
            "--dep",
            "build_options",
            "--dep",
            "aro",
            &format!("-Mroot={}", layout.compiler_root),
            &format!("-Mbuild_options={}", layout.config_file),
            &format!("-Maro={}", layout.aro_root),
        ]);

        let runtime_name = layout
            .runtime_c
            .strip_suffix(".c")
            .unwrap_or(&layout.runtime_c);
        let emit_runtime_c = strings(&[
            &stage1_cmd,
            &layout.lib_dir,
            "build-obj",
            "-ofmt=c",
            "-OReleaseSmall",
            "--name",
            runtime_name,
            &format!("-femit-bin={}", layout.runtime_c),
            "-target",
            &triple,
            &format!("-Mroot={}", layout.runtime_root),
        ]);

        let mut build_stage2 = native(
            cc,
            flags.output(&stage2_exe),
            &[layout.stage2_c.as_str(), layout.runtime_c.as_str()],
            flags.codegen(OptLevel::Speed),
        );
        if resolved.toolchain.family == ToolchainFamily::UnixLike {
            build_stage2.push("-fno-stack-protector".to_string());
        }
        build_stage2.push(flags.include(&layout.include_dir));
        build_stage2.extend(flags.link(STAGE2_STACK_BYTES, false, true));

        let mut ordinal = 0;
        let mut stage = |argv: Vec<String>, description: &str| {
            ordinal += 1;
            BuildStage::new(ordinal, argv, description)
        };

        let phases = vec![
            PlannedPhase {
                phase: Phase::BuildTranslator,
                action: PhaseAction::Run(vec![stage(build_translator, "compile the translator")]),
                outputs: vec![translator_exe],
            },
            PlannedPhase {
                phase: Phase::TranslateSeed,
                action: PhaseAction::Run(vec![stage(translate_seed, "translate the seed")]),
                outputs: vec![layout.stage1_c.clone()],
            },
            PlannedPhase {
                phase: Phase::BuildStage1Compiler,
                action: PhaseAction::Run(vec![stage(build_stage1, "compile the stage-1 compiler")]),
                outputs: vec![stage1_exe],
            },
            PlannedPhase {
                phase: Phase::EmitConfig,
                action: PhaseAction::EmitConfig {
                    path: resolved.config.path(&layout.config_file),
                },
                outputs: vec![layout.config_file.clone()],
            },
            PlannedPhase {
                phase: Phase::BuildStage2Compiler,
                action: PhaseAction::Run(vec![
                    stage(emit_stage2_c, "emit the stage-2 compiler as C"),
                    stage(emit_runtime_c, "emit the runtime library as C"),
                    stage(build_stage2, "compile the stage-2 compiler"),
                ]),
                outputs: vec![
                    layout.stage2_c.clone(),
                    layout.runtime_c.clone(),
                    stage2_exe,
                ],
            },
        ];

        Self { phases }
    }

    /// Returns the phases in execution order.
    #[must_use]
    pub fn phases(&self) -> &[PlannedPhase] {
        &self.phases
    }

    /// Iterates over every invocation of the run, in order.
    pub fn invocations(&self) -> impl Iterator<Item = &BuildStage> {
        self.phases.iter().flat_map(PlannedPhase::invocations)
    }

    /// Renders the plan as text, one phase per block.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for planned in &self.phases {
            let _ = writeln!(
                out,
                "[{}/{}] {}",
                planned.phase.ordinal(),
                Phase::ALL.len(),
                planned.phase.description()
            );
            for line in planned.command_lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
        out
    }
}

fn native(cc: &str, output: Vec<String>, sources: &[&str], codegen: Vec<String>) -> Vec<String> {
    let mut argv = vec![cc.to_string()];
    argv.extend(output);
    argv.extend(sources.iter().map(|s| (*s).to_string()));
    argv.extend(codegen);
    argv
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BootstrapConfig;
    use crate::host::{HostTriple, ToolchainChoice};
    use pretty_assertions::assert_eq;

    fn linux() -> PlatformInfo {
        PlatformInfo::new(Some("x86_64"), Some("linux"), "gnu")
    }

    fn resolved(cc: &str, platform: PlatformInfo, triple: HostTriple) -> ResolvedConfig {
        ResolvedConfig::new(
            BootstrapConfig::default(),
            platform,
            triple,
            ToolchainChoice::new(cc),
        )
    }

    fn argv(plan: &StagePlan, ordinal: usize) -> Vec<String> {
        plan.invocations()
            .find(|s| s.ordinal == ordinal)
            .map(|s| s.argv.clone())
            .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_plan() {
        let plan = StagePlan::new(&resolved("cc", linux(), HostTriple::new("x86_64", "linux", "")));

        assert_eq!(
            argv(&plan, 1),
            strings(&["cc", "-o", "zig-wasm2c", "stage1/wasm2c.c", "-std=c99", "-O2"])
        );
        assert_eq!(
            argv(&plan, 2),
            strings(&["./zig-wasm2c", "stage1/zig1.wasm", "zig1.c"])
        );
        assert_eq!(
            argv(&plan, 3),
            strings(&[
                "cc",
                "-o",
                "zig1",
                "zig1.c",
                "stage1/wasi.c",
                "-std=c99",
                "-Os",
                "-lm",
                "-Wl,-z,stack-size=0x1000000",
            ])
        );

        let emit = argv(&plan, 4);
        assert_eq!(emit[0], "./zig1");
        assert!(emit.contains(&"-femit-bin=zig2.c".to_string()));
        assert!(emit.contains(&"-Mbuild_options=config.zig".to_string()));
        let target = emit.iter().position(|a| a == "-target").unwrap();
        assert_eq!(emit[target + 1], "x86_64-linux");

        let runtime = argv(&plan, 5);
        assert!(runtime.contains(&"build-obj".to_string()));
        assert!(runtime.contains(&"compiler_rt".to_string()));
        assert!(runtime.contains(&"-femit-bin=compiler_rt.c".to_string()));

        assert_eq!(
            argv(&plan, 6),
            strings(&[
                "cc",
                "-o",
                "zig2",
                "zig2.c",
                "compiler_rt.c",
                "-std=c99",
                "-O2",
                "-fno-stack-protector",
                "-Istage1",
                "-Wl,-z,stack-size=0x10000000",
                "-pthread",
            ])
        );
    }

    #[test]
    fn test_msvc_flags() {
        let platform = PlatformInfo::new(Some("x86_64"), Some("windows"), "msvc");
        let profile = FlagProfile::new(ToolchainFamily::MsvcLike, platform);
        assert_eq!(profile.output("zig1.exe"), strings(&["/nologo", "/Fezig1.exe"]));
        assert_eq!(profile.codegen(OptLevel::Size), strings(&["/Os"]));
        assert_eq!(profile.include("stage1"), "/Istage1");
        assert_eq!(
            profile.link(STAGE2_STACK_BYTES, false, true),
            strings(&["/link", "/STACK:268435456"])
        );
    }

    #[test]
    fn test_msvc_plan_keeps_linker_flags_last() {
        let platform = PlatformInfo::new(Some("x86_64"), Some("windows"), "msvc");
        let plan = StagePlan::new(&resolved(
            "cl",
            platform,
            HostTriple::new("x86_64", "windows", "-msvc"),
        ));
        let native: Vec<_> = plan.invocations().filter(|s| s.program() == "cl").collect();
        assert_eq!(
            native.iter().map(|s| s.ordinal).collect::<Vec<_>>(),
            vec![1, 3, 6]
        );
        for stage in &native {
            assert!(stage.argv.iter().all(|a| !a.starts_with('-')));
        }

        let linked: Vec<_> = native
            .iter()
            .filter(|s| s.argv.iter().any(|a| a == "/link"))
            .collect();
        assert_eq!(linked.iter().map(|s| s.ordinal).collect::<Vec<_>>(), vec![3, 6]);
        for stage in linked {
            let link = stage.argv.iter().position(|a| a == "/link").unwrap();
            assert_eq!(link, stage.argv.len() - 2);
            assert!(stage.argv[link + 1].starts_with("/STACK:"));
        }
    }

    #[test]
    fn test_msvc_translator_build_has_no_linker_section() {
        let platform = PlatformInfo::new(Some("x86_64"), Some("windows"), "msvc");
        let plan = StagePlan::new(&resolved(
            "cl",
            platform,
            HostTriple::new("x86_64", "windows", "-msvc"),
        ));
        let translator = plan.invocations().next().unwrap();
        assert_eq!(translator.ordinal, 1);
        assert!(translator.argv.iter().all(|a| a != "/link"));
    }

    #[test]
    fn test_stack_flags_per_platform() {
        let mac = FlagProfile::new(
            ToolchainFamily::UnixLike,
            PlatformInfo::new(Some("aarch64"), Some("macos"), ""),
        );
        assert_eq!(
            mac.link(STAGE2_STACK_BYTES, false, true),
            strings(&["-Wl,-stack_size,0x10000000", "-pthread"])
        );

        let mingw = FlagProfile::new(
            ToolchainFamily::UnixLike,
            PlatformInfo::new(Some("x86_64"), Some("windows"), "gnu"),
        );
        assert_eq!(
            mingw.link(STAGE1_STACK_BYTES, true, true),
            strings(&["-lm", "-Wl,--stack,16777216"])
        );
    }

    #[test]
    fn test_stage2_stack_is_larger() {
        assert!(STAGE2_STACK_BYTES > STAGE1_STACK_BYTES);
    }

    #[test]
    fn test_same_compiler_for_every_native_stage() {
        let plan = StagePlan::new(&resolved("gcc-13", linux(), HostTriple::new("x86_64", "linux", "")));
        let natives: Vec<usize> = plan
            .invocations()
            .filter(|s| s.program() == "gcc-13")
            .map(|s| s.ordinal)
            .collect();
        assert_eq!(natives, vec![1, 3, 6]);
    }

    #[test]
    fn test_literal_triple_passed_verbatim() {
        let plan = StagePlan::new(&resolved(
            "cc",
            linux(),
            HostTriple::Literal("x86_64-linux-musl".to_string()),
        ));
        let targets: Vec<&BuildStage> = plan
            .invocations()
            .filter(|s| s.argv.contains(&"x86_64-linux-musl".to_string()))
            .collect();
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_plan_structure() {
        let plan = StagePlan::new(&resolved("cc", linux(), HostTriple::new("x86_64", "linux", "")));
        let phases: Vec<Phase> = plan.phases().iter().map(|p| p.phase).collect();
        assert_eq!(phases, Phase::ALL.to_vec());

        let ordinals: Vec<usize> = plan.invocations().map(|s| s.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3, 4, 5, 6]);

        let emit = &plan.phases()[3];
        assert!(emit.invocations().is_empty());
        assert_eq!(emit.outputs, vec!["config.zig".to_string()]);
    }

    #[test]
    fn test_render_lists_every_phase() {
        let plan = StagePlan::new(&resolved("cc", linux(), HostTriple::new("x86_64", "linux", "")));
        let text = plan.render();
        assert!(text.starts_with("[1/5] build the bytecode translator\n"));
        assert!(text.contains("[4/5] write the build configuration"));
        assert!(text
            .lines()
            .any(|l| l.starts_with("    write ") && l.ends_with("config.zig")));
        assert_eq!(text.lines().filter(|l| l.starts_with("    ")).count(), 7);
    }
}
