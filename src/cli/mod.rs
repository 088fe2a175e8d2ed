//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::env_help;
use crate::models::SuiteId;

/// RustOS kernel test-suite runner
#[derive(Parser, Debug)]
#[command(name = "rustos-testrunner")]
#[command(version = "0.1.0")]
#[command(about = "Build and run RustOS kernel test suites under QEMU")]
#[command(long_about = None)]
pub struct Args {
    /// Suites to run: all, quick, kernel, syscalls, stress or help
    #[arg(default_value = "all")]
    pub selection: String,

    /// Configuration file (YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Emulator executable, overrides configuration
    #[arg(short, long)]
    pub emulator: Option<String>,

    /// Report format (table, json, json-pretty, summary)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Use existing artifacts instead of building
    #[arg(long)]
    pub no_build: bool,

    /// Skip emulator and toolchain checks
    #[arg(long)]
    pub skip_probe: bool,

    /// List registered suites and exit
    #[arg(short, long)]
    pub list: bool,

    /// Write the default configuration to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub init_config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Usage text printed for the `help` selection and after selection errors
pub fn usage() -> String {
    let mut text = String::from("Usage: rustos-testrunner [SELECTION] [OPTIONS]\n\nSelections:\n");
    text.push_str("  all       Run every suite (default)\n");
    text.push_str("  quick     Run every suite except stress\n");
    for id in SuiteId::all() {
        text.push_str(&format!("  {:9} {}\n", id.name(), id.description()));
    }
    text.push_str("  help      Show this message\n");
    text.push_str("\nEnvironment:\n");
    text.push_str(&env_help());
    text.push_str("\n\nRun with --help for all options.\n");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selection() {
        let args = Args::parse_from(["rustos-testrunner"]);
        assert_eq!(args.selection, "all");
        assert!(!args.no_build);
        assert!(args.format.is_none());
    }

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from([
            "rustos-testrunner",
            "stress",
            "--emulator",
            "/opt/qemu/bin/qemu-system-aarch64",
            "--format",
            "json",
            "--no-build",
            "--skip-probe",
            "--no-color",
        ]);
        assert_eq!(args.selection, "stress");
        assert_eq!(
            args.emulator.as_deref(),
            Some("/opt/qemu/bin/qemu-system-aarch64")
        );
        assert_eq!(args.format.as_deref(), Some("json"));
        assert!(args.no_build);
        assert!(args.skip_probe);
        assert!(args.no_color);
    }

    #[test]
    fn test_usage_lists_every_selection() {
        let text = usage();
        for token in crate::models::Selection::tokens() {
            assert!(text.contains(&format!("  {token} ")), "missing {token}");
        }
        assert!(text.contains("RUSTOS_TEST_EMULATOR"));
    }
}
