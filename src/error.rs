//! Run-level errors
//!
//! Errors that stop a run before or between suites. Per-suite failures
//! are classifications (see [`crate::models::Classification`]), not errors.

use serde::Serialize;
use thiserror::Error;

use crate::models::SuiteId;

/// Process exit codes
pub mod exit_code {
    pub const SUCCESS: u8 = 0;
    pub const SUITE_FAILURE: u8 = 1;
    pub const USAGE: u8 = 2;
    pub const MISSING_DEPENDENCY: u8 = 3;
    pub const BUILD_FAILED: u8 = 4;
    pub const INTERRUPTED: u8 = 130;
}

/// Errors that abort a run
#[derive(Error, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunError {
    #[error("unknown selection '{token}' (expected one of: all, quick, kernel, syscalls, stress, help)")]
    UnknownSelection { token: String },

    #[error("missing dependency: {name} ({detail})")]
    MissingDependency { name: String, detail: String },

    #[error("build failed for suite '{suite}': {detail}")]
    BuildFailed { suite: SuiteId, detail: String },

    #[error("run interrupted")]
    Interrupted,
}

impl RunError {
    pub fn missing(name: impl Into<String>, detail: impl Into<String>) -> Self {
        RunError::MissingDependency {
            name: name.into(),
            detail: detail.into(),
        }
    }

    pub fn build_failed(suite: SuiteId, detail: impl Into<String>) -> Self {
        RunError::BuildFailed {
            suite,
            detail: detail.into(),
        }
    }

    /// Short label used in reports
    pub fn label(&self) -> &'static str {
        match self {
            RunError::UnknownSelection { .. } => "UnknownSelection",
            RunError::MissingDependency { .. } => "MissingDependency",
            RunError::BuildFailed { .. } => "BuildFailed",
            RunError::Interrupted => "Interrupted",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            RunError::UnknownSelection { .. } => exit_code::USAGE,
            RunError::MissingDependency { .. } => exit_code::MISSING_DEPENDENCY,
            RunError::BuildFailed { .. } => exit_code::BUILD_FAILED,
            RunError::Interrupted => exit_code::INTERRUPTED,
        }
    }
}
