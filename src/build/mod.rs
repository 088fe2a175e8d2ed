//! Suite artifact builds
//!
//! Builds each suite's kernel binary with cargo and locates the artifact.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::RunError;
use crate::models::SuiteDescriptor;
use crate::utils::{own_process_group, Timer};

/// Where a suite's artifact stands after the build step
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArtifactStatus {
    Present(PathBuf),
    Missing(PathBuf),
}

impl ArtifactStatus {
    pub fn check(path: &Path) -> Self {
        if path.is_file() {
            ArtifactStatus::Present(path.to_path_buf())
        } else {
            ArtifactStatus::Missing(path.to_path_buf())
        }
    }
}

/// Produces the artifact for a suite
#[allow(async_fn_in_trait)]
pub trait ArtifactBuilder {
    /// Build the suite, then report whether its artifact exists.
    /// A failed build is `BuildFailed`, which aborts the run.
    async fn ensure_artifact(&self, suite: &SuiteDescriptor) -> Result<ArtifactStatus, RunError>;
}

/// Builds suites with `cargo build --bin <suite> --target <triple>`
pub struct CargoBuilder {
    cargo: String,
    workspace_dir: PathBuf,
    target_dir: PathBuf,
    target: String,
    release: bool,
    extra_args: Vec<String>,
    skip_build: bool,
}

impl CargoBuilder {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            cargo: config.build.cargo.clone(),
            workspace_dir: config.build.workspace_dir.clone(),
            target_dir: config.build.resolved_target_dir(),
            target: config.toolchain.target.clone(),
            release: config.build.release,
            extra_args: config.build.extra_args.clone(),
            skip_build: false,
        }
    }

    /// Only check for existing artifacts, never invoke cargo
    pub fn skip_build(mut self, skip: bool) -> Self {
        self.skip_build = skip;
        self
    }

    fn build_args(&self, suite: &SuiteDescriptor) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            "--bin".to_string(),
            suite.binary.clone(),
            "--target".to_string(),
            self.target.clone(),
            "--target-dir".to_string(),
            self.target_dir.to_string_lossy().to_string(),
        ];
        if self.release {
            args.push("--release".to_string());
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }
}

impl ArtifactBuilder for CargoBuilder {
    async fn ensure_artifact(&self, suite: &SuiteDescriptor) -> Result<ArtifactStatus, RunError> {
        if self.skip_build {
            debug!("Skipping build of {}", suite.binary);
            return Ok(ArtifactStatus::check(&suite.artifact));
        }

        info!("Building {} ({})", suite.id, suite.binary);
        let timer = Timer::start(format!("build {}", suite.binary));

        // cargo reports progress on stderr; let it through so build errors are visible
        let mut command = Command::new(&self.cargo);
        command
            .args(self.build_args(suite))
            .current_dir(&self.workspace_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        let status = own_process_group(&mut command)
            .status()
            .await
            .map_err(|e| {
                RunError::build_failed(suite.id, format!("failed to run {}: {e}", self.cargo))
            })?;

        timer.stop();

        if !status.success() {
            return Err(RunError::build_failed(
                suite.id,
                format!("cargo exited with {status}"),
            ));
        }

        Ok(ArtifactStatus::check(&suite.artifact))
    }
}
