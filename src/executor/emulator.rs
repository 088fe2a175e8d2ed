//! Emulator execution
//!
//! Boots one suite artifact under QEMU, forwards the serial console and
//! enforces the suite's wall-clock budget.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{AppConfig, EmulatorConfig};
use crate::models::RawOutcome;
use crate::utils::own_process_group;

/// Time allowed for the console reader to drain after the emulator is gone
const CONSOLE_DRAIN: Duration = Duration::from_secs(2);

/// How a supervised emulator run ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Finished(RawOutcome),
    Interrupted,
}

/// Runs a suite artifact to completion
#[allow(async_fn_in_trait)]
pub trait SuiteExecutor {
    /// Boot `artifact` and wait for the earliest of exit, `timeout` or
    /// cancellation. An error means the emulator could not be started.
    async fn run(
        &self,
        artifact: &Path,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome>;
}

/// [`SuiteExecutor`] backed by `qemu-system-aarch64`
pub struct QemuRunner {
    config: EmulatorConfig,
    failure_markers: Vec<String>,
}

impl QemuRunner {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            config: config.emulator.clone(),
            failure_markers: config.failure_markers.clone(),
        }
    }

    fn build_args(&self, artifact: &Path) -> Vec<String> {
        let mut args = vec![
            "-machine".to_string(),
            self.config.machine.clone(),
            "-cpu".to_string(),
            self.config.cpu.clone(),
            "-smp".to_string(),
            self.config.cores.to_string(),
            "-m".to_string(),
            self.config.memory.clone(),
            "-nographic".to_string(),
            "-serial".to_string(),
            "mon:stdio".to_string(),
            "-kernel".to_string(),
            artifact.to_string_lossy().to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args
    }
}

impl SuiteExecutor for QemuRunner {
    async fn run(
        &self,
        artifact: &Path,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<RunOutcome> {
        let args = self.build_args(artifact);
        debug!("{} {}", self.config.binary, args.join(" "));

        let mut command = Command::new(&self.config.binary);
        command.args(args);
        supervise(command, self.failure_markers.clone(), timeout, cancel).await
    }
}

enum Stop {
    Exited(std::io::Result<ExitStatus>),
    Deadline,
    Cancelled,
}

/// Spawn `command`, forward its stdout and wait for exit, deadline or cancel.
/// The child is killed and reaped in the latter two cases. An exit observed
/// after cancellation is reported as `Interrupted`.
async fn supervise(
    mut command: Command,
    failure_markers: Vec<String>,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<RunOutcome> {
    let mut child = own_process_group(&mut command)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .kill_on_drop(true)
        .spawn()
        .context("Failed to start emulator")?;

    let stdout = child
        .stdout
        .take()
        .context("Emulator stdout was not captured")?;
    let console = tokio::spawn(forward_console(stdout, tokio::io::stdout(), failure_markers));

    let stop = tokio::select! {
        status = child.wait() => Stop::Exited(status),
        _ = tokio::time::sleep(timeout) => Stop::Deadline,
        _ = cancel.cancelled() => Stop::Cancelled,
    };

    let exit_code = match stop {
        Stop::Exited(status) => {
            let status = status.context("Failed to wait for emulator")?;
            debug!("Emulator exited with {}", status);
            if cancel.is_cancelled() {
                return Ok(RunOutcome::Interrupted);
            }
            Some(status.code())
        }
        Stop::Deadline => {
            warn!("Emulator exceeded {}s, killing it", timeout.as_secs());
            if let Err(e) = child.kill().await {
                warn!("Failed to kill emulator: {}", e);
            }
            None
        }
        Stop::Cancelled => {
            debug!("Run cancelled, killing emulator");
            if let Err(e) = child.kill().await {
                warn!("Failed to kill emulator: {}", e);
            }
            return Ok(RunOutcome::Interrupted);
        }
    };

    let failure_line = match tokio::time::timeout(CONSOLE_DRAIN, console).await {
        Ok(Ok(Ok(line))) => line,
        Ok(Ok(Err(e))) => {
            debug!("Console forwarding stopped: {}", e);
            None
        }
        Ok(Err(e)) => {
            debug!("Console task failed: {}", e);
            None
        }
        Err(_) => {
            debug!("Console did not drain within {:?}", CONSOLE_DRAIN);
            None
        }
    };

    let raw = match exit_code {
        Some(code) => RawOutcome::exited(code),
        None => RawOutcome::timed_out(),
    };
    Ok(RunOutcome::Finished(RawOutcome {
        failure_line,
        ..raw
    }))
}

/// Copy console output line by line to `out`, returning the first line that
/// contains one of `markers`. Bytes are passed through unchanged.
async fn forward_console<R, W>(
    reader: R,
    mut out: W,
    markers: Vec<String>,
) -> std::io::Result<Option<String>>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut first_failure = None;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        out.write_all(&buf).await?;
        out.flush().await?;

        if first_failure.is_none() {
            let line = String::from_utf8_lossy(&buf);
            if markers.iter().any(|m| line.contains(m.as_str())) {
                first_failure = Some(line.trim().to_string());
            }
        }
    }

    Ok(first_failure)
}
