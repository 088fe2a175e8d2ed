//! Final run report

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{exit_code, RunError};
use crate::models::RunRecord;

use super::RunSummary;

/// Everything known about one invocation once it has ended
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub selection: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub records: Vec<RunRecord>,
    pub summary: RunSummary,
    pub overall_success: bool,
    /// Why the run stopped early, if it did
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort: Option<RunError>,
}

impl RunReport {
    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }

    /// Process exit status: the abort class if aborted, otherwise pass/fail
    pub fn exit_code(&self) -> u8 {
        match &self.abort {
            Some(err) => err.exit_code(),
            None if self.overall_success => exit_code::SUCCESS,
            None => exit_code::SUITE_FAILURE,
        }
    }
}
