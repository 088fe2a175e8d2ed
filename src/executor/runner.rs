//! Suite run driver
//!
//! Drives the probe, then one build -> run -> classify -> record cycle per
//! selected suite, strictly in selection order.

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::build::{ArtifactBuilder, ArtifactStatus};
use crate::config::AppConfig;
use crate::error::RunError;
use crate::models::{Attempt, PendingRecord, RunRecord, Selection, SuiteDescriptor};
use crate::preflight::{DependencyProber, HostTools};
use crate::results::{Aggregator, RunReport};
use crate::utils::Timer;

use super::classify::classify;
use super::emulator::{RunOutcome, SuiteExecutor};

/// Sequential suite runner
pub struct SuiteRunner<H, B, X> {
    prober: Option<DependencyProber<H>>,
    builder: B,
    executor: X,
    clean_exit_code: i32,
    cancel: CancellationToken,
}

impl<H, B, X> SuiteRunner<H, B, X>
where
    H: HostTools,
    B: ArtifactBuilder,
    X: SuiteExecutor,
{
    /// Create a runner. Pass `None` as `prober` to skip dependency checks.
    pub fn new(
        prober: Option<DependencyProber<H>>,
        builder: B,
        executor: X,
        config: &AppConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            prober,
            builder,
            executor,
            clean_exit_code: config.clean_exit_code,
            cancel,
        }
    }

    /// Run `suites` in order. `observer` sees each record as soon as it is
    /// classified. The report always carries whatever was recorded, even
    /// when the run was aborted.
    pub async fn run(
        &self,
        selection: Selection,
        suites: &[SuiteDescriptor],
        mut observer: impl FnMut(&RunRecord),
    ) -> RunReport {
        let started_at = Utc::now();
        let timer = Timer::start(format!("selection {selection}"));
        info!("Running selection '{}' ({} suites)", selection, suites.len());

        let mut aggregator = Aggregator::new();
        let abort = self
            .drive(suites, &mut aggregator, &mut observer)
            .await
            .err();

        if let Some(err) = &abort {
            error!("Run aborted: {}", err);
        }

        let summary = aggregator.summarize();
        info!(
            "Run completed in {}ms - Pass: {}/{} ({:.1}%)",
            timer.stop().as_millis(),
            summary.passed,
            summary.total,
            summary.pass_rate()
        );

        aggregator.into_report(selection, started_at, abort)
    }

    async fn drive(
        &self,
        suites: &[SuiteDescriptor],
        aggregator: &mut Aggregator,
        observer: &mut impl FnMut(&RunRecord),
    ) -> Result<(), RunError> {
        if let Some(prober) = &self.prober {
            let checks = tokio::select! {
                checks = prober.probe() => checks?,
                _ = self.cancel.cancelled() => return Err(RunError::Interrupted),
            };
            for check in checks {
                debug!("  {}: {}", check.name, check.message);
            }
        }

        for suite in suites {
            if self.cancel.is_cancelled() {
                return Err(RunError::Interrupted);
            }

            let status = tokio::select! {
                status = self.builder.ensure_artifact(suite) => status,
                _ = self.cancel.cancelled() => return Err(RunError::Interrupted),
            };
            // A build killed by the interrupt is not a build failure
            if self.cancel.is_cancelled() {
                return Err(RunError::Interrupted);
            }
            let status = status?;

            let pending = PendingRecord::start(suite.id);
            let attempt = match status {
                ArtifactStatus::Missing(path) => {
                    warn!("No artifact for {} at {}", suite.id, path.display());
                    Attempt::NoArtifact(path)
                }
                ArtifactStatus::Present(path) => {
                    info!(
                        "Running {} (timeout {}s)",
                        suite.id,
                        suite.timeout.as_secs()
                    );
                    match self.executor.run(&path, suite.timeout, &self.cancel).await {
                        Ok(RunOutcome::Finished(raw)) => Attempt::Ran(raw),
                        Ok(RunOutcome::Interrupted) => return Err(RunError::Interrupted),
                        Err(e) => Attempt::LaunchFailed(format!("{e:#}")),
                    }
                }
            };

            // The suite in flight when the interrupt arrived is not recorded
            if self.cancel.is_cancelled() {
                return Err(RunError::Interrupted);
            }

            let classification = classify(&attempt, self.clean_exit_code, suite.timeout);
            let record = pending.finish(&attempt, classification);
            debug!("  {}", record);

            observer(&record);
            aggregator.record(record);
        }

        Ok(())
    }
}
