//! Output formatters for run results
//!
//! Provides Table, JSON and one-line summary formats.

use crate::models::{Classification, RunRecord, SuiteDescriptor};
use crate::results::RunReport;

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Summary,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "summary" => Some(OutputFormat::Summary),
            _ => None,
        }
    }
}

/// Result formatter
pub struct ResultFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ResultFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.colorize {
            format!("\x1b[{color}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn status(&self, classification: &Classification) -> String {
        let label = format!("{} {:7}", classification.symbol(), classification.to_string());
        let color = match classification {
            Classification::Passed => "32",
            Classification::TimedOut { .. } | Classification::ArtifactMissing { .. } => "33",
            Classification::Failed { .. } => "31",
        };
        self.paint(&label, color)
    }

    /// Format a single record as it completes. JSON formats emit only the
    /// final report, so they have no per-record line.
    pub fn format_record(&self, record: &RunRecord) -> Option<String> {
        match self.format {
            OutputFormat::Table => Some(self.format_record_table(record)),
            OutputFormat::Summary => Some(record.to_string()),
            OutputFormat::Json | OutputFormat::JsonPretty => None,
        }
    }

    fn format_record_table(&self, record: &RunRecord) -> String {
        let mut line = format!(
            "{:10} {} [{:>7}ms]",
            record.suite.name(),
            self.status(&record.classification),
            record.duration_ms()
        );
        if let Some(message) = record.classification.message() {
            line.push_str(&format!("  {message}"));
        }
        line
    }

    /// Format the final report
    pub fn format_report(&self, report: &RunReport) -> String {
        match self.format {
            OutputFormat::Table => self.format_report_table(report),
            OutputFormat::Json => serde_json::to_string(report).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(report).unwrap_or_default(),
            OutputFormat::Summary => self.format_report_brief(report),
        }
    }

    fn format_report_table(&self, report: &RunReport) -> String {
        let mut output = String::new();
        let summary = &report.summary;

        // Header
        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!(
            "║  RustOS test run - selection: {:30} ║\n",
            report.selection
        ));
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        // Results
        if report.records.is_empty() {
            output.push_str("║  (no suites ran)\n");
        }
        for record in &report.records {
            output.push_str(&format!("║  {}\n", self.format_record_table(record)));
        }

        if let Some(abort) = &report.abort {
            output.push_str("╠══════════════════════════════════════════════════════════════╣\n");
            let label = self.paint(abort.label(), "31");
            output.push_str(&format!("║  Aborted ({label}): {abort}\n"));
        }

        // Footer
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        let pass_str = self.paint(&summary.passed.to_string(), "32");
        let fail_str = if summary.failed > 0 {
            self.paint(&summary.failed.to_string(), "31")
        } else {
            summary.failed.to_string()
        };

        output.push_str(&format!(
            "║  Total: {:2} | Passed: {} | Failed: {} | Timed out: {:2}\n",
            summary.total, pass_str, fail_str, summary.timed_out
        ));
        output.push_str(&format!(
            "║  Pass Rate: {:5.1}% | Duration: {:8}ms\n",
            summary.pass_rate(),
            report.duration_ms()
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        let verdict = if report.overall_success {
            self.paint("ALL SUITES PASSED", "32")
        } else {
            self.paint("RUN FAILED", "31")
        };
        output.push_str(&format!("{verdict}\n"));

        output
    }

    fn format_report_brief(&self, report: &RunReport) -> String {
        let mut line = format!(
            "{}: {} - {:.1}% in {}ms",
            report.selection,
            report.summary,
            report.summary.pass_rate(),
            report.duration_ms()
        );
        if let Some(abort) = &report.abort {
            line.push_str(&format!(" - aborted: {}", abort.label()));
        }
        line
    }
}

/// Registry listing for `--list`
pub fn format_registry<'a>(suites: impl IntoIterator<Item = &'a SuiteDescriptor>) -> String {
    let mut output = String::new();
    output.push_str("\nRegistered test suites\n");
    output.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    for suite in suites {
        output.push_str(&format!(
            "  {:9} [{:10}] {:14} {:>4}s  {}\n",
            suite.id.name(),
            suite.category().to_string(),
            suite.binary,
            suite.timeout.as_secs(),
            suite.artifact.display()
        ));
        output.push_str(&format!("            {}\n", suite.id.description()));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::RunError;
    use crate::models::{Attempt, PendingRecord, RawOutcome, SuiteId, SuiteRegistry};
    use crate::results::{Aggregator, RunSummary};
    use chrono::Utc;

    fn report(abort: Option<RunError>) -> RunReport {
        let mut aggregator = Aggregator::new();
        aggregator.record(
            PendingRecord::start(SuiteId::Kernel)
                .finish(&Attempt::Ran(RawOutcome::exited(Some(0))), Classification::Passed),
        );
        aggregator.record(PendingRecord::start(SuiteId::Stress).finish(
            &Attempt::Ran(RawOutcome::timed_out()),
            Classification::TimedOut { limit_secs: 300 },
        ));
        aggregator.into_report(crate::models::Selection::All, Utc::now(), abort)
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_str("TABLE"), Some(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("csv"), None);
    }

    #[test]
    fn test_table_report_plain() {
        let formatter = ResultFormatter::new(OutputFormat::Table).no_color();
        let text = formatter.format_report(&report(None));

        assert!(!text.contains("\x1b["));
        assert!(text.contains("kernel"));
        assert!(text.contains("TIMEOUT"));
        assert!(text.contains("killed after 300s timeout"));
        assert!(text.contains("Total:  2 | Passed: 1 | Failed: 1 | Timed out:  1"));
        assert!(text.contains("RUN FAILED"));
        assert!(!text.contains("Aborted"));
    }

    #[test]
    fn test_table_report_names_abort() {
        let formatter = ResultFormatter::new(OutputFormat::Table).no_color();
        let text = formatter.format_report(&report(Some(RunError::build_failed(
            SuiteId::Syscalls,
            "cargo exited with 101",
        ))));
        assert!(text.contains("Aborted (BuildFailed)"));
    }

    #[test]
    fn test_colored_status() {
        let formatter = ResultFormatter::new(OutputFormat::Table);
        let record = PendingRecord::start(SuiteId::Kernel)
            .finish(&Attempt::Ran(RawOutcome::exited(Some(0))), Classification::Passed);
        assert!(formatter.format_record(&record).unwrap().contains("\x1b[32m"));
    }

    #[test]
    fn test_json_has_no_live_records() {
        let record = PendingRecord::start(SuiteId::Kernel)
            .finish(&Attempt::Ran(RawOutcome::exited(Some(0))), Classification::Passed);
        for format in [OutputFormat::Json, OutputFormat::JsonPretty] {
            assert!(ResultFormatter::new(format).format_record(&record).is_none());
        }
        assert!(ResultFormatter::new(OutputFormat::Summary)
            .format_record(&record)
            .is_some());
    }

    #[test]
    fn test_summary_line() {
        let formatter = ResultFormatter::new(OutputFormat::Summary);
        let line = formatter.format_report(&report(Some(RunError::Interrupted)));
        assert!(line.starts_with("all: Total: 2 | Passed: 1 | Failed: 1 (1 timed out) - 50.0%"));
        assert!(line.ends_with("aborted: Interrupted"));
    }

    #[test]
    fn test_json_report() {
        let formatter = ResultFormatter::new(OutputFormat::Json);
        let json: serde_json::Value =
            serde_json::from_str(&formatter.format_report(&report(None))).unwrap();
        assert_eq!(json["summary"]["timed_out"], 1);
        assert_eq!(json["overall_success"], false);

        let summary: RunSummary = serde_json::from_value(json["summary"].clone()).unwrap();
        assert_eq!(summary.total, 2);
    }

    #[test]
    fn test_registry_listing() {
        let registry = SuiteRegistry::new(&AppConfig::default());
        let text = format_registry(registry.iter());
        assert!(text.contains("syscall_tests"));
        assert!(text.contains("300s"));
        assert!(text.contains("functional"));
    }
}
