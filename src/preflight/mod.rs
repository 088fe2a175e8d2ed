//! Dependency probing
//!
//! Verifies the emulator and the Rust toolchain pieces the kernel build
//! needs before anything is built or run.

use anyhow::{Context, Result};
use std::fmt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::RunError;
use crate::utils::Timer;

/// A toolchain piece managed by rustup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Requirement {
    Target(String),
    Component(String),
}

impl Requirement {
    pub fn name(&self) -> &str {
        match self {
            Requirement::Target(name) | Requirement::Component(name) => name,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Requirement::Target(_) => "target",
            Requirement::Component(_) => "component",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.name())
    }
}

/// Host-side tools the prober queries
#[allow(async_fn_in_trait)]
pub trait HostTools {
    /// First line of `<emulator> --version`, or `None` if it cannot run
    async fn emulator_version(&self, emulator: &str) -> Option<String>;

    async fn is_installed(&self, requirement: &Requirement) -> Result<bool>;

    async fn install(&self, requirement: &Requirement) -> Result<()>;
}

/// [`HostTools`] backed by the real emulator binary and rustup
pub struct Rustup {
    rustup: String,
}

impl Rustup {
    pub fn new(rustup: impl Into<String>) -> Self {
        Self {
            rustup: rustup.into(),
        }
    }

    fn subcommand(requirement: &Requirement) -> &'static str {
        match requirement {
            Requirement::Target(_) => "target",
            Requirement::Component(_) => "component",
        }
    }
}

impl HostTools for Rustup {
    async fn emulator_version(&self, emulator: &str) -> Option<String> {
        let output = Command::new(emulator).arg("--version").output().await;

        match output {
            Ok(o) if o.status.success() => {
                let stdout = String::from_utf8_lossy(&o.stdout);
                Some(stdout.lines().next().unwrap_or_default().trim().to_string())
            }
            Ok(o) => {
                debug!("{} --version exited with {}", emulator, o.status);
                None
            }
            Err(e) => {
                debug!("{} could not be started: {}", emulator, e);
                None
            }
        }
    }

    async fn is_installed(&self, requirement: &Requirement) -> Result<bool> {
        let output = Command::new(&self.rustup)
            .args([Self::subcommand(requirement), "list", "--installed"])
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.rustup))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("rustup {} list failed: {}", Self::subcommand(requirement), stderr.trim());
        }

        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(listing_contains(&listing, requirement))
    }

    async fn install(&self, requirement: &Requirement) -> Result<()> {
        info!("Installing {}...", requirement);

        let output = Command::new(&self.rustup)
            .args([Self::subcommand(requirement), "add", requirement.name()])
            .output()
            .await
            .with_context(|| format!("Failed to run {}", self.rustup))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("Failed to install {requirement}: {}", stderr.trim());
        }

        Ok(())
    }
}

/// Whether a `rustup ... list --installed` listing contains `requirement`.
///
/// Targets match exactly. Components are listed with a host triple suffix
/// and without the `-preview` suffix they are requested with
/// (`llvm-tools-preview` is listed as `llvm-tools-x86_64-unknown-linux-gnu`).
fn listing_contains(listing: &str, requirement: &Requirement) -> bool {
    let mut lines = listing.lines().map(str::trim);
    match requirement {
        Requirement::Target(name) => lines.any(|line| line == name),
        Requirement::Component(name) => {
            let base = name.strip_suffix("-preview").unwrap_or(name);
            let prefix = format!("{base}-");
            lines.any(|line| line == name || line == base || line.starts_with(&prefix))
        }
    }
}

/// Individual probe result
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeCheck {
    /// Check name
    pub name: String,

    /// Result message
    pub message: String,
}

impl ProbeCheck {
    fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Fail-fast gate run before any suite is built
pub struct DependencyProber<H> {
    host: H,
    emulator: String,
    requirements: Vec<Requirement>,
    auto_install: bool,
}

impl<H: HostTools> DependencyProber<H> {
    pub fn new(host: H, config: &AppConfig) -> Self {
        let mut requirements = vec![Requirement::Target(config.toolchain.target.clone())];
        requirements.extend(
            config
                .toolchain
                .components
                .iter()
                .cloned()
                .map(Requirement::Component),
        );

        Self {
            host,
            emulator: config.emulator.binary.clone(),
            requirements,
            auto_install: config.toolchain.auto_install,
        }
    }

    /// Check the emulator, then each toolchain requirement in order
    pub async fn probe(&self) -> Result<Vec<ProbeCheck>, RunError> {
        let timer = Timer::start("dependency probe");
        info!("Checking emulator and toolchain");

        let mut checks = Vec::new();

        match self.host.emulator_version(&self.emulator).await {
            Some(version) => {
                debug!("Emulator: {}", version);
                checks.push(ProbeCheck::new(&self.emulator, version));
            }
            None => {
                return Err(RunError::missing(
                    &self.emulator,
                    "emulator not found or not runnable",
                ));
            }
        }

        for requirement in &self.requirements {
            checks.push(self.ensure(requirement).await?);
        }

        timer.stop();
        Ok(checks)
    }

    async fn ensure(&self, requirement: &Requirement) -> Result<ProbeCheck, RunError> {
        if self.installed(requirement).await {
            debug!("{} is installed", requirement);
            return Ok(ProbeCheck::new(requirement.to_string(), "installed"));
        }

        if !self.auto_install {
            return Err(RunError::missing(
                requirement.name(),
                format!("rustup {} is not installed", requirement),
            ));
        }

        warn!("{} is missing, attempting install", requirement);
        if let Err(e) = self.host.install(requirement).await {
            warn!("Install of {} failed: {:#}", requirement, e);
        }

        if self.installed(requirement).await {
            Ok(ProbeCheck::new(requirement.to_string(), "installed on demand"))
        } else {
            Err(RunError::missing(
                requirement.name(),
                format!("rustup {} still missing after install attempt", requirement),
            ))
        }
    }

    async fn installed(&self, requirement: &Requirement) -> bool {
        match self.host.is_installed(requirement).await {
            Ok(installed) => installed,
            Err(e) => {
                debug!("Could not query {}: {:#}", requirement, e);
                false
            }
        }
    }
}
