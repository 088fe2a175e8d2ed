//! Run-wide counters
//!
//! The [`Aggregator`] is the only writer of the [`RunSummary`]; records are
//! folded in one at a time, in execution order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RunError;
use crate::models::{Classification, RunRecord, Selection};

use super::RunReport;

/// Aggregate pass/fail counts for one invocation.
///
/// `timed_out` is a sub-count of `failed`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl RunSummary {
    /// Every suite passed and at least one ran
    pub fn overall_success(&self) -> bool {
        self.failed == 0 && self.total > 0
    }

    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {} | Passed: {} | Failed: {}",
            self.total, self.passed, self.failed
        )?;
        if self.timed_out > 0 {
            write!(f, " ({} timed out)", self.timed_out)?;
        }
        Ok(())
    }
}

/// Accumulates run records into a [`RunSummary`]
#[derive(Debug, Default)]
pub struct Aggregator {
    summary: RunSummary,
    records: Vec<RunRecord>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one finished record into the counters
    pub fn record(&mut self, record: RunRecord) {
        self.summary.total += 1;
        match record.classification {
            Classification::Passed => self.summary.passed += 1,
            Classification::TimedOut { .. } => {
                self.summary.failed += 1;
                self.summary.timed_out += 1;
            }
            Classification::Failed { .. } | Classification::ArtifactMissing { .. } => {
                self.summary.failed += 1
            }
        }
        debug_assert_eq!(
            self.summary.passed + self.summary.failed,
            self.summary.total
        );
        self.records.push(record);
    }

    pub fn summarize(&self) -> RunSummary {
        self.summary
    }

    #[cfg(test)]
    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    /// Close the run and produce its report
    pub fn into_report(
        self,
        selection: Selection,
        started_at: DateTime<Utc>,
        abort: Option<RunError>,
    ) -> RunReport {
        RunReport {
            selection: selection.to_string(),
            started_at,
            finished_at: Utc::now(),
            overall_success: self.summary.overall_success() && abort.is_none(),
            summary: self.summary,
            records: self.records,
            abort,
        }
    }
}
