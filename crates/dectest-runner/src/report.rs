//! Run totals and the machine-readable report.

use std::fmt;

use serde::Serialize;

use crate::runner::{FileReport, SkipCause, Verdict};

/// Summary of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Files processed.
    pub files: usize,
    /// Cases whose result matched.
    pub passed: usize,
    /// Cases the oracle rejected.
    pub failed: usize,
    /// Cases excluded by a registry or the rounding latch.
    pub skipped: usize,
    /// Cases the engine does not implement.
    pub unsupported: usize,
    /// Cases the engine failed on.
    pub errored: usize,
    /// Lines that did not parse.
    pub parse_errors: usize,
    /// Total number of cases.
    pub total: usize,
}

impl RunSummary {
    /// Totals over `reports`.
    #[must_use]
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            summary.absorb(report);
        }
        summary
    }

    /// Adds one file's counts.
    pub fn absorb(&mut self, report: &FileReport) {
        self.files += 1;
        self.parse_errors += report.parse_errors.len();
        for case in &report.cases {
            self.total += 1;
            match &case.verdict {
                Verdict::Passed => self.passed += 1,
                Verdict::Failed(_) => self.failed += 1,
                Verdict::Skipped(SkipCause::Unsupported(_)) => self.unsupported += 1,
                Verdict::Skipped(_) => self.skipped += 1,
                Verdict::Errored(_) => self.errored += 1,
            }
        }
    }

    /// Whether no case failed or errored and every line parsed.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.failed == 0 && self.errored == 0 && self.parse_errors == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} skipped, {} unsupported, {} errored, {} parse error(s)",
            self.passed,
            self.failed,
            self.skipped,
            self.unsupported,
            self.errored,
            self.parse_errors
        )
    }
}

/// File reports plus their summary, as printed by `check --json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunOutput {
    /// Per-file reports in run order.
    pub files: Vec<FileReport>,
    /// Totals.
    pub summary: RunSummary,
}

impl RunOutput {
    /// Wraps `files` with their totals.
    #[must_use]
    pub fn new(files: Vec<FileReport>) -> Self {
        let summary = RunSummary::from_reports(&files);
        Self { files, summary }
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{RunOutput, RunSummary};
    use crate::runner::{ParseOnly, RunConfig, Runner};
    use std::path::Path;

    fn survey(text: &str) -> RunOutput {
        let mut runner = Runner::new(ParseOnly, RunConfig::default());
        RunOutput::new(vec![runner.run_text(Path::new("t.decTest"), text)])
    }

    #[test]
    fn summary_buckets_verdicts() {
        let output = survey("addx001 add 1 1 -> 2\nadd900 add 1 1 -> 2\naddx002 add 1 -> 2\n");
        assert_eq!(
            output.summary,
            RunSummary {
                files: 1,
                passed: 0,
                failed: 0,
                skipped: 1,
                unsupported: 1,
                errored: 0,
                parse_errors: 1,
                total: 2,
            }
        );
        assert!(!output.summary.is_clean());
        assert_eq!(
            output.summary.to_string(),
            "0 passed, 0 failed, 1 skipped, 1 unsupported, 0 errored, 1 parse error(s)"
        );
    }

    #[test]
    fn json_carries_verdict_tags() {
        let json = survey("add900 add 1 1 -> 2\n").to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let verdict = &value["files"][0]["cases"][0]["verdict"];
        assert_eq!(verdict["status"], "skipped");
        assert_eq!(verdict["detail"]["cause"], "excluded");
        assert_eq!(value["summary"]["total"], 1);
    }
}
