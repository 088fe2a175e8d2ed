//! Suite registry and selection
//!
//! Defines the kernel test suites, their build targets and timeout
//! budgets, and how a selection token maps onto them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::config::AppConfig;
use crate::error::RunError;

/// Kernel test suites
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteId {
    Kernel,
    Syscalls,
    Stress,
}

impl SuiteId {
    /// Get suite name as used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            SuiteId::Kernel => "kernel",
            SuiteId::Syscalls => "syscalls",
            SuiteId::Stress => "stress",
        }
    }

    /// Get cargo binary that builds this suite
    pub fn binary(&self) -> &'static str {
        match self {
            SuiteId::Kernel => "kernel_tests",
            SuiteId::Syscalls => "syscall_tests",
            SuiteId::Stress => "stress_tests",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SuiteId::Kernel => "Memory, process, filesystem and pipe primitives",
            SuiteId::Syscalls => "System call dispatch through the handler table",
            SuiteId::Stress => "Sustained allocation, pipe and file churn",
        }
    }

    pub fn category(&self) -> SuiteCategory {
        match self {
            SuiteId::Kernel | SuiteId::Syscalls => SuiteCategory::Functional,
            SuiteId::Stress => SuiteCategory::Stress,
        }
    }

    /// Get all suites in canonical order
    pub fn all() -> [SuiteId; 3] {
        [SuiteId::Kernel, SuiteId::Syscalls, SuiteId::Stress]
    }

    fn index(&self) -> usize {
        match self {
            SuiteId::Kernel => 0,
            SuiteId::Syscalls => 1,
            SuiteId::Stress => 2,
        }
    }
}

impl fmt::Display for SuiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Suite category, which decides the timeout budget
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteCategory {
    Functional,
    Stress,
}

impl fmt::Display for SuiteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuiteCategory::Functional => write!(f, "functional"),
            SuiteCategory::Stress => write!(f, "stress"),
        }
    }
}

/// Everything needed to build and run one suite
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuiteDescriptor {
    pub id: SuiteId,
    pub binary: String,
    pub artifact: PathBuf,
    pub timeout: Duration,
}

impl SuiteDescriptor {
    pub fn category(&self) -> SuiteCategory {
        self.id.category()
    }
}

/// Static table of suite descriptors, one per [`SuiteId`]
#[derive(Clone, Debug)]
pub struct SuiteRegistry {
    descriptors: [SuiteDescriptor; 3],
}

impl SuiteRegistry {
    pub fn new(config: &AppConfig) -> Self {
        let descriptors = SuiteId::all().map(|id| SuiteDescriptor {
            id,
            binary: id.binary().to_string(),
            artifact: config
                .build
                .artifact_path(&config.toolchain.target, id.binary()),
            timeout: config.timeouts.for_category(id.category()),
        });
        Self { descriptors }
    }

    pub fn get(&self, id: SuiteId) -> &SuiteDescriptor {
        &self.descriptors[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SuiteDescriptor> {
        self.descriptors.iter()
    }

    /// Descriptors for a selection, in selection order
    pub fn select(&self, selection: Selection) -> Vec<SuiteDescriptor> {
        selection
            .suite_ids()
            .into_iter()
            .map(|id| self.get(id).clone())
            .collect()
    }
}

/// A parsed selection token
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Selection {
    All,
    Quick,
    Single(SuiteId),
    Help,
}

impl Selection {
    /// Resolve a selection token, failing on anything unrecognized
    pub fn resolve(token: &str) -> Result<Selection, RunError> {
        match token.trim().to_lowercase().as_str() {
            "all" => Ok(Selection::All),
            "quick" => Ok(Selection::Quick),
            "kernel" => Ok(Selection::Single(SuiteId::Kernel)),
            "syscalls" => Ok(Selection::Single(SuiteId::Syscalls)),
            "stress" => Ok(Selection::Single(SuiteId::Stress)),
            "help" => Ok(Selection::Help),
            _ => Err(RunError::UnknownSelection {
                token: token.to_string(),
            }),
        }
    }

    /// Suites this selection runs, in execution order. Empty only for `Help`.
    pub fn suite_ids(&self) -> Vec<SuiteId> {
        match self {
            Selection::All => SuiteId::all().to_vec(),
            Selection::Quick => SuiteId::all()
                .into_iter()
                .filter(|id| id.category() != SuiteCategory::Stress)
                .collect(),
            Selection::Single(id) => vec![*id],
            Selection::Help => Vec::new(),
        }
    }

    pub fn is_help(&self) -> bool {
        matches!(self, Selection::Help)
    }

    /// Every token accepted by [`Selection::resolve`]
    #[cfg(test)]
    pub fn tokens() -> [&'static str; 6] {
        ["all", "kernel", "syscalls", "stress", "quick", "help"]
    }
}

impl FromStr for Selection {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selection::resolve(s)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => write!(f, "all"),
            Selection::Quick => write!(f, "quick"),
            Selection::Single(id) => write!(f, "{id}"),
            Selection::Help => write!(f, "help"),
        }
    }
}
