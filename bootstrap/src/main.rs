use anyhow::Context;
use bootstrap::config::{BootstrapConfig, EnvSnapshot};
use bootstrap::errors::{BootstrapError, EXIT_SUCCESS};
use bootstrap::host::PlatformInfo;
use bootstrap::observability::{init_logging, LogFormat, RunReport};
use bootstrap::pipeline::{StageDriver, StagePlan};
use bootstrap::process::SystemRunner;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "bootstrap")]
#[command(author, version, about = "Build the stage-2 compiler from the bytecode seed", long_about = None)]
struct Cli {
    /// Directory holding the seed and sources; artifacts are written here
    #[arg(short = 'C', long, value_name = "DIR", default_value = ".")]
    work_dir: PathBuf,

    /// Print the resolved commands without running anything
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON run report to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Log line format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(err) => {
            eprintln!("bootstrap: {}", err.diagnostic());
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: &Cli) -> Result<(), BootstrapError> {
    let resolved = BootstrapConfig::new()
        .with_work_dir(&cli.work_dir)
        .resolve(&EnvSnapshot::capture(), PlatformInfo::native())?;

    if cli.dry_run {
        print!("{}", StagePlan::new(&resolved).render());
        return Ok(());
    }

    let runner = SystemRunner::new(resolved.work_dir());
    match StageDriver::new(resolved, runner).run() {
        Ok(report) => {
            write_report(cli.report.as_deref(), &report);
            Ok(())
        }
        Err(abort) => {
            write_report(cli.report.as_deref(), &abort.report);
            Err(abort.error)
        }
    }
}

fn write_report(path: Option<&Path>, report: &RunReport) {
    let Some(path) = path else { return };
    if let Err(err) = save_report(path, report) {
        tracing::warn!(path = %path.display(), error = %format!("{err:#}"), "Could not write run report");
    }
}

fn save_report(path: &Path, report: &RunReport) -> anyhow::Result<()> {
    let json = report
        .to_json_pretty()
        .context("failed to serialize run report")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
