//! Configuration module
//!
//! Handles loading and managing configuration.

mod env;
mod file;

pub use env::{env_help, EnvConfig};
pub use file::load_config;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::models::SuiteCategory;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Version of config file format
    pub version: String,

    /// Emulator invocation
    pub emulator: EmulatorConfig,

    /// Rust toolchain requirements
    pub toolchain: ToolchainConfig,

    /// Kernel build settings
    pub build: BuildConfig,

    /// Per-category timeout budgets
    pub timeouts: TimeoutConfig,

    /// Emulator exit code that means the suite shut down cleanly
    pub clean_exit_code: i32,

    /// Console substrings that mark a suite as failed
    pub failure_markers: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            emulator: EmulatorConfig::default(),
            toolchain: ToolchainConfig::default(),
            build: BuildConfig::default(),
            timeouts: TimeoutConfig::default(),
            clean_exit_code: 0,
            failure_markers: vec!["panic:".to_string()],
        }
    }
}

impl AppConfig {
    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !["1.0"].contains(&self.version.as_str()) {
            anyhow::bail!("Unsupported config version: {}", self.version);
        }
        if self.emulator.binary.trim().is_empty() {
            anyhow::bail!("emulator.binary must not be empty");
        }
        if self.emulator.cores == 0 {
            anyhow::bail!("emulator.cores must be at least 1");
        }
        if self.toolchain.target.trim().is_empty() {
            anyhow::bail!("toolchain.target must not be empty");
        }
        if self.timeouts.functional_secs == 0 || self.timeouts.stress_secs == 0 {
            anyhow::bail!("timeouts must be greater than zero");
        }
        Ok(())
    }
}

/// Emulator machine profile
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmulatorConfig {
    /// Emulator executable
    pub binary: String,

    /// Machine model
    pub machine: String,

    /// CPU model
    pub cpu: String,

    /// Core count
    pub cores: u32,

    /// Memory size, in QEMU notation
    pub memory: String,

    /// Extra arguments appended after the fixed profile
    pub extra_args: Vec<String>,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            binary: "qemu-system-aarch64".to_string(),
            machine: "virt".to_string(),
            cpu: "cortex-a57".to_string(),
            cores: 1,
            memory: "128M".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Toolchain requirements checked before any suite runs
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainConfig {
    /// rustup executable
    pub rustup: String,

    /// Target triple the kernel is built for
    pub target: String,

    /// Required rustup components
    pub components: Vec<String>,

    /// Install missing target/components once before giving up
    pub auto_install: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            rustup: "rustup".to_string(),
            target: "aarch64-unknown-none".to_string(),
            components: vec!["rust-src".to_string(), "llvm-tools-preview".to_string()],
            auto_install: true,
        }
    }
}

/// Kernel build settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// cargo executable
    pub cargo: String,

    /// Kernel workspace directory
    pub workspace_dir: PathBuf,

    /// Target directory, relative to the workspace unless absolute
    pub target_dir: PathBuf,

    /// Build with `--release`
    pub release: bool,

    /// Extra arguments passed to `cargo build`
    pub extra_args: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            cargo: "cargo".to_string(),
            workspace_dir: PathBuf::from("."),
            target_dir: PathBuf::from("target"),
            release: true,
            extra_args: Vec::new(),
        }
    }
}

impl BuildConfig {
    pub fn profile_dir(&self) -> &'static str {
        if self.release {
            "release"
        } else {
            "debug"
        }
    }

    pub fn resolved_target_dir(&self) -> PathBuf {
        self.workspace_dir.join(&self.target_dir)
    }

    /// Deterministic artifact location for a binary
    pub fn artifact_path(&self, target: &str, binary: &str) -> PathBuf {
        self.resolved_target_dir()
            .join(target)
            .join(self.profile_dir())
            .join(binary)
    }
}

/// Wall-clock budgets per suite category
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub functional_secs: u64,
    pub stress_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            functional_secs: 60,
            stress_secs: 300,
        }
    }
}

impl TimeoutConfig {
    pub fn for_category(&self, category: SuiteCategory) -> Duration {
        match category {
            SuiteCategory::Functional => Duration::from_secs(self.functional_secs),
            SuiteCategory::Stress => Duration::from_secs(self.stress_secs),
        }
    }
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
