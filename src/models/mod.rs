//! Data models for suite execution
//!
//! Suite descriptors, selections, run records and classifications.

mod run_record;
mod suite;

pub use run_record::{Attempt, Classification, PendingRecord, RawOutcome, RunRecord};
pub use suite::{Selection, SuiteCategory, SuiteDescriptor, SuiteId, SuiteRegistry};
