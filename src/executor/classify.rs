//! Result classification
//!
//! Maps a suite attempt onto its final [`Classification`].

use std::time::Duration;

use crate::models::{Attempt, Classification};

/// Classify one attempt. Rules, first match wins:
/// no artifact, then timeout, then clean exit without a console failure,
/// otherwise failed.
pub fn classify(attempt: &Attempt, clean_exit_code: i32, limit: Duration) -> Classification {
    match attempt {
        Attempt::NoArtifact(path) => Classification::ArtifactMissing { path: path.clone() },
        Attempt::LaunchFailed(reason) => Classification::Failed {
            exit_code: None,
            reason: Some(reason.clone()),
        },
        Attempt::Ran(raw) if raw.timed_out => Classification::TimedOut {
            limit_secs: limit.as_secs(),
        },
        Attempt::Ran(raw) => match (&raw.failure_line, raw.exit_code) {
            (None, Some(code)) if code == clean_exit_code => Classification::Passed,
            (reason, exit_code) => Classification::Failed {
                exit_code,
                reason: reason.clone(),
            },
        },
    }
}
