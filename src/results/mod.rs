//! Result aggregation and the final run report

mod aggregator;
mod report;

pub use aggregator::{Aggregator, RunSummary};
pub use report::RunReport;
