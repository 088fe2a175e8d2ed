//! Output formatting module
//!
//! Renders per-suite lines, the final report and the suite listing.

mod formatter;

pub use formatter::{format_registry, OutputFormat, ResultFormatter};
