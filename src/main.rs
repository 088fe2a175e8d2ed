//! RustOS test runner - builds and boots kernel test suites under QEMU
//!
//! Selects suites from a fixed registry, checks the emulator and toolchain,
//! builds each suite's kernel binary, boots it with a wall-clock budget and
//! reports a pass/fail summary through the process exit code.
//!
//! ## Usage
//!
//! ```bash
//! # Run every suite
//! rustos-testrunner
//!
//! # Run the functional suites only
//! rustos-testrunner quick
//!
//! # Run one suite against prebuilt artifacts, JSON report
//! rustos-testrunner stress --no-build --format json
//!
//! # Show the suite registry
//! rustos-testrunner --list
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod build;
mod cli;
mod config;
mod error;
mod executor;
mod models;
mod output;
mod preflight;
mod results;
mod utils;

use build::CargoBuilder;
use cli::Args;
use config::{load_config, AppConfig, EnvConfig};
use error::exit_code;
use executor::{QemuRunner, SuiteRunner};
use models::{Selection, SuiteRegistry};
use output::{format_registry, OutputFormat, ResultFormatter};
use preflight::{DependencyProber, Rustup};
use utils::{init_logger, spawn_interrupt_listener, LogLevel};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let env = EnvConfig::load();

    init_logger(LogLevel::from_verbose(args.verbose || env.verbose_or(false)));

    // Selection errors are reported before anything is probed or built
    let selection = match Selection::resolve(&args.selection) {
        Ok(selection) => selection,
        Err(e) => {
            eprintln!("error: {e}\n");
            eprint!("{}", cli::usage());
            return ExitCode::from(e.exit_code());
        }
    };

    if selection.is_help() {
        print!("{}", cli::usage());
        return ExitCode::from(exit_code::SUCCESS);
    }

    if let Some(path) = &args.init_config {
        return match AppConfig::default().save(path) {
            Ok(()) => {
                info!("Wrote default configuration to {}", path.display());
                ExitCode::from(exit_code::SUCCESS)
            }
            Err(e) => {
                error!("{:#}", e);
                ExitCode::from(exit_code::USAGE)
            }
        };
    }

    let (config, format) = match settings(&args, &env) {
        Ok(settings) => settings,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(exit_code::USAGE);
        }
    };

    let registry = SuiteRegistry::new(&config);
    if args.list {
        print!("{}", format_registry(registry.iter()));
        return ExitCode::from(exit_code::SUCCESS);
    }

    let mut formatter = ResultFormatter::new(format);
    if args.no_color || !std::io::stdout().is_terminal() {
        formatter = formatter.no_color();
    }

    let cancel = CancellationToken::new();
    let listener = spawn_interrupt_listener(cancel.clone());

    let prober = (!args.skip_probe)
        .then(|| DependencyProber::new(Rustup::new(&config.toolchain.rustup), &config));
    let builder = CargoBuilder::new(&config).skip_build(args.no_build || env.no_build_or(false));
    let runner = SuiteRunner::new(
        prober,
        builder,
        QemuRunner::new(&config),
        &config,
        cancel.clone(),
    );

    let suites = registry.select(selection);
    let report = runner
        .run(selection, &suites, |record| {
            if let Some(line) = formatter.format_record(record) {
                println!("{line}");
            }
        })
        .await;

    // Stops the listener if no interrupt arrived
    cancel.cancel();
    if let Err(e) = listener.await {
        error!("Interrupt listener failed: {}", e);
    }

    println!("{}", formatter.format_report(&report));
    ExitCode::from(report.exit_code())
}

/// Merge file, environment and CLI settings, in increasing precedence
fn settings(args: &Args, env: &EnvConfig) -> Result<(AppConfig, OutputFormat)> {
    let config_path = args.config.clone().or_else(|| env.config_file.clone());
    let mut config = load_config(config_path.as_deref())?;

    env.apply(&mut config);
    if let Some(emulator) = &args.emulator {
        config.emulator.binary = emulator.clone();
    }
    config.validate().context("Invalid configuration")?;

    let format = match args.format.as_deref().or(env.format.as_deref()) {
        Some(name) => OutputFormat::from_str(name)
            .with_context(|| format!("Unknown output format: {name}"))?,
        None => OutputFormat::Table,
    };

    Ok((config, format))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_overrides_file() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(file, "emulator:\n  binary: qemu-from-file\ntimeouts:\n  stress_secs: 900").unwrap();

        let args = Args::parse_from([
            "rustos-testrunner",
            "--config",
            file.path().to_str().unwrap(),
            "--emulator",
            "qemu-from-cli",
            "--format",
            "summary",
        ]);
        let (config, format) = settings(&args, &EnvConfig::default()).unwrap();

        assert_eq!(config.emulator.binary, "qemu-from-cli");
        assert_eq!(config.timeouts.stress_secs, 900);
        assert_eq!(format, OutputFormat::Summary);
    }

    #[test]
    fn test_env_between_file_and_cli() {
        let env = EnvConfig {
            emulator: Some("qemu-from-env".to_string()),
            format: Some("json".to_string()),
            ..Default::default()
        };
        let args = Args::parse_from(["rustos-testrunner", "--config", "/nonexistent.yaml"]);
        assert!(settings(&args, &env).is_err());

        let args = Args::parse_from(["rustos-testrunner"]);
        let (config, format) = settings(&args, &env).unwrap();
        assert_eq!(config.emulator.binary, "qemu-from-env");
        assert_eq!(format, OutputFormat::Json);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let args = Args::parse_from(["rustos-testrunner", "--format", "csv"]);
        let err = settings(&args, &EnvConfig::default()).unwrap_err();
        assert!(err.to_string().contains("csv"));
    }
}
