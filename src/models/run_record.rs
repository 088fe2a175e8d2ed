//! Run records and classifications
//!
//! One [`RunRecord`] is produced per suite execution attempt.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::SuiteId;

/// How the emulator process ended
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOutcome {
    /// Exit code, `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
    /// The wall-clock budget expired and the process was killed
    pub timed_out: bool,
    /// First console line that matched a failure marker
    pub failure_line: Option<String>,
}

impl RawOutcome {
    pub fn exited(exit_code: Option<i32>) -> Self {
        Self {
            exit_code,
            timed_out: false,
            failure_line: None,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            exit_code: None,
            timed_out: true,
            failure_line: None,
        }
    }

    #[cfg(test)]
    pub fn with_failure_line(mut self, line: impl Into<String>) -> Self {
        self.failure_line = Some(line.into());
        self
    }
}

/// What happened when a suite was attempted
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attempt {
    /// The build finished but no artifact was found
    NoArtifact(PathBuf),
    /// The emulator could not be started
    LaunchFailed(String),
    /// The emulator ran and terminated
    Ran(RawOutcome),
}

impl Attempt {
    pub fn raw(&self) -> Option<&RawOutcome> {
        match self {
            Attempt::Ran(raw) => Some(raw),
            _ => None,
        }
    }
}

/// Final verdict for one suite
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Classification {
    Passed,
    Failed {
        exit_code: Option<i32>,
        reason: Option<String>,
    },
    TimedOut {
        limit_secs: u64,
    },
    ArtifactMissing {
        path: PathBuf,
    },
}

impl Classification {
    #[cfg(test)]
    pub fn is_pass(&self) -> bool {
        matches!(self, Classification::Passed)
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Classification::Passed => "✓",
            Classification::Failed { .. } => "✗",
            Classification::TimedOut { .. } => "⏱",
            Classification::ArtifactMissing { .. } => "?",
        }
    }

    /// Human readable detail, if any
    pub fn message(&self) -> Option<String> {
        match self {
            Classification::Passed => None,
            Classification::Failed { exit_code, reason } => Some(match (exit_code, reason) {
                (Some(code), Some(reason)) => format!("exit code {code}: {reason}"),
                (Some(code), None) => format!("exit code {code}"),
                (None, Some(reason)) => reason.clone(),
                (None, None) => "terminated by signal".to_string(),
            }),
            Classification::TimedOut { limit_secs } => {
                Some(format!("killed after {limit_secs}s timeout"))
            }
            Classification::ArtifactMissing { path } => {
                Some(format!("artifact not found at {}", path.display()))
            }
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Passed => write!(f, "PASS"),
            Classification::Failed { .. } => write!(f, "FAIL"),
            Classification::TimedOut { .. } => write!(f, "TIMEOUT"),
            Classification::ArtifactMissing { .. } => write!(f, "MISSING"),
        }
    }
}

/// A record opened right before a suite is handed to the emulator
#[derive(Debug)]
pub struct PendingRecord {
    suite: SuiteId,
    started_at: DateTime<Utc>,
}

impl PendingRecord {
    pub fn start(suite: SuiteId) -> Self {
        Self {
            suite,
            started_at: Utc::now(),
        }
    }

    /// Close the record once the attempt has been classified
    pub fn finish(self, attempt: &Attempt, classification: Classification) -> RunRecord {
        RunRecord {
            suite: self.suite,
            started_at: self.started_at,
            finished_at: Utc::now(),
            outcome: attempt.raw().cloned(),
            classification,
        }
    }
}

/// Result of one suite execution attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub suite: SuiteId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: Option<RawOutcome>,
    pub classification: Classification,
}

impl RunRecord {
    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{}ms]",
            self.classification.symbol(),
            self.suite,
            self.duration_ms()
        )?;
        if let Some(msg) = self.classification.message() {
            write!(f, " - {msg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_messages() {
        assert_eq!(Classification::Passed.message(), None);

        let failed = Classification::Failed {
            exit_code: Some(1),
            reason: Some("Kernel test panic: oops".to_string()),
        };
        assert_eq!(
            failed.message().as_deref(),
            Some("exit code 1: Kernel test panic: oops")
        );

        let killed = Classification::Failed {
            exit_code: None,
            reason: None,
        };
        assert_eq!(killed.message().as_deref(), Some("terminated by signal"));

        let timed_out = Classification::TimedOut { limit_secs: 300 };
        assert_eq!(timed_out.to_string(), "TIMEOUT");
    }

    #[test]
    fn test_pending_record_finish() {
        let pending = PendingRecord::start(SuiteId::Kernel);
        let attempt = Attempt::Ran(RawOutcome::exited(Some(0)));
        let record = pending.finish(&attempt, Classification::Passed);

        assert_eq!(record.suite, SuiteId::Kernel);
        assert!(record.finished_at >= record.started_at);
        assert_eq!(record.outcome, Some(RawOutcome::exited(Some(0))));
        assert!(record.to_string().contains("kernel"));
    }

    #[test]
    fn test_missing_artifact_has_no_outcome() {
        let attempt = Attempt::NoArtifact(PathBuf::from("target/kernel_tests"));
        let record = PendingRecord::start(SuiteId::Stress).finish(
            &attempt,
            Classification::ArtifactMissing {
                path: PathBuf::from("target/kernel_tests"),
            },
        );
        assert!(record.outcome.is_none());
    }

    #[test]
    fn test_classification_serialization() {
        let json = serde_json::to_value(Classification::TimedOut { limit_secs: 60 }).unwrap();
        assert_eq!(json["status"], "timed_out");
        assert_eq!(json["limit_secs"], 60);
    }
}
