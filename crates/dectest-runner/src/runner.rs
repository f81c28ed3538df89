//! Per-case run loop: skip registry, rounding latch, engine, oracle.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use dectest_core::{
    ArithmeticEngine, Case, CaseScanner, Directive, DirectiveTracker, EngineError, LineItem,
    Mismatch, Operation, Oracle, OracleConfig, Rounding, RoundingMode, SkipReason, SkipSet,
    DEFAULT_SUPPORTED_ROUNDING,
};
use serde::Serialize;

use crate::corpus::{discover, resolve_include, CorpusError, CorpusFile, IncludeChain};

/// Evaluations slower than this are logged by default.
pub const DEFAULT_SLOW_THRESHOLD: Duration = Duration::from_secs(1);

/// Run-wide settings.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Oracle policy.
    pub oracle: OracleConfig,
    /// Rounding modes the engine implements.
    pub supported_rounding: Vec<RoundingMode>,
    /// Consult the built-in skip registry.
    pub builtin_skips: bool,
    /// Engine-specific exclusions, checked before the built-in registry.
    pub extra_skips: SkipSet,
    /// Follow `dectest:` includes.
    pub follow_includes: bool,
    /// Evaluations slower than this are logged at `warn`.
    pub slow_threshold: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            oracle: OracleConfig::default(),
            supported_rounding: DEFAULT_SUPPORTED_ROUNDING.to_vec(),
            builtin_skips: true,
            extra_skips: SkipSet::empty(),
            follow_includes: true,
            slow_threshold: DEFAULT_SLOW_THRESHOLD,
        }
    }
}

/// Why a case was not evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "cause", content = "detail", rename_all = "snake_case")]
pub enum SkipCause {
    /// Listed in a skip registry, or carrying a `#` encoded operand or
    /// result.
    Excluded(SkipReason),
    /// Written under a rounding mode the engine lacks or the tracker did not
    /// recognize.
    UnsupportedRounding(Rounding),
    /// The engine does not implement the operation.
    Unsupported(Operation),
}

impl fmt::Display for SkipCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Excluded(reason) => write!(f, "{reason}"),
            Self::UnsupportedRounding(rounding) => match rounding.mode() {
                Some(mode) => write!(f, "rounding {mode} unsupported"),
                None => write!(f, "rounding mode unrecognized"),
            },
            Self::Unsupported(operation) => write!(f, "{operation} unsupported"),
        }
    }
}

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Verdict {
    /// Result and conditions matched.
    Passed,
    /// The oracle rejected the result.
    Failed(Mismatch),
    /// The case was not evaluated.
    Skipped(SkipCause),
    /// The engine failed without a result.
    Errored(String),
}

impl Verdict {
    /// Whether the case passed.
    #[must_use]
    pub const fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Passed => write!(f, "passed"),
            Self::Failed(mismatch) => write!(f, "FAILED ({})", mismatch.kind),
            Self::Skipped(cause) => write!(f, "skipped ({cause})"),
            Self::Errored(message) => write!(f, "ERROR ({message})"),
        }
    }
}

/// Verdict for one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    /// 1-based position across the whole run.
    pub ordinal: usize,
    /// Case id.
    pub id: String,
    /// 1-based line in its file.
    pub line: usize,
    /// Outcome.
    pub verdict: Verdict,
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: {}", self.ordinal, self.id, self.verdict)
    }
}

/// A corpus line that was neither a case nor a valid directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseFailure {
    /// 1-based line number.
    pub line: usize,
    /// Rendered error.
    pub message: String,
}

/// Everything that happened in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    /// File path.
    pub path: PathBuf,
    /// Directive lines absorbed.
    pub directives: usize,
    /// Case verdicts in line order.
    pub cases: Vec<CaseReport>,
    /// Lines that failed to parse.
    pub parse_errors: Vec<ParseFailure>,
}

impl FileReport {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            directives: 0,
            cases: Vec::new(),
            parse_errors: Vec::new(),
        }
    }

    /// Whether every evaluated case passed and every line parsed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.parse_errors.is_empty()
            && self
                .cases
                .iter()
                .all(|c| matches!(c.verdict, Verdict::Passed | Verdict::Skipped(_)))
    }
}

impl fmt::Display for FileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.cases.iter().filter(|c| c.verdict.is_passed()).count();
        write!(
            f,
            "{}: {} case(s), {} passed, {} parse error(s)",
            self.path.display(),
            self.cases.len(),
            passed,
            self.parse_errors.len()
        )
    }
}

/// An engine that implements nothing; every case it sees is reported as
/// unsupported. Useful for parse-only surveys of a corpus.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOnly;

impl ArithmeticEngine for ParseOnly {}

/// Drives an engine over corpus files.
#[derive(Debug)]
pub struct Runner<E> {
    engine: E,
    oracle: Oracle,
    config: RunConfig,
    ordinal: usize,
}

impl<E: ArithmeticEngine> Runner<E> {
    /// Runner for `engine` under `config`.
    #[must_use]
    pub fn new(engine: E, config: RunConfig) -> Self {
        Self {
            engine,
            oracle: Oracle::new(config.oracle),
            config,
            ordinal: 0,
        }
    }

    /// The engine under test.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Consumes the runner, returning the engine.
    #[must_use]
    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Runs every corpus file under `path`, following includes.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError`] when a file cannot be read or includes form a
    /// cycle.
    pub fn run_path(&mut self, path: &Path) -> Result<Vec<FileReport>, CorpusError> {
        let mut reports = Vec::new();
        for file in discover(path)? {
            reports.extend(self.run_file(&file)?);
        }
        Ok(reports)
    }

    /// Runs one file; included files follow it in the returned reports.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError`] when a file cannot be read or includes form a
    /// cycle.
    pub fn run_file(&mut self, path: &Path) -> Result<Vec<FileReport>, CorpusError> {
        let mut chain = IncludeChain::new();
        let mut reports = Vec::new();
        self.run_nested(path, None, &mut chain, &mut reports)?;
        Ok(reports)
    }

    /// Runs in-memory corpus text labelled `path`. `dectest:` lines are
    /// counted as directives but not followed.
    pub fn run_text(&mut self, path: &Path, text: &str) -> FileReport {
        let mut report = FileReport::new(path);
        for include in self.scan_into(&mut report, text) {
            tracing::debug!(file = %path.display(), include, "include not followed");
        }
        report
    }

    fn run_nested(
        &mut self,
        path: &Path,
        from: Option<&Path>,
        chain: &mut IncludeChain,
        reports: &mut Vec<FileReport>,
    ) -> Result<(), CorpusError> {
        chain.enter(path, from)?;
        let file = CorpusFile::load(path)?;
        tracing::info!(file = %file.name(), depth = chain.depth(), "running corpus file");

        let mut report = FileReport::new(path);
        let includes = self.scan_into(&mut report, &file.text);
        tracing::info!(
            file = %file.name(),
            cases = report.cases.len(),
            parse_errors = report.parse_errors.len(),
            "finished corpus file"
        );
        reports.push(report);

        if self.config.follow_includes {
            for include in includes {
                let target = resolve_include(&include, path);
                self.run_nested(&target, Some(path), chain, reports)?;
            }
        }
        chain.leave();
        Ok(())
    }

    /// Scans `text` into `report`, returning the include targets it names.
    fn scan_into(&mut self, report: &mut FileReport, text: &str) -> Vec<String> {
        let tracker = DirectiveTracker::with_supported_rounding(&self.config.supported_rounding);
        let mut includes = Vec::new();
        for scanned in CaseScanner::with_tracker(text, tracker) {
            match scanned.item {
                Ok(LineItem::Directive(directive)) => {
                    report.directives += 1;
                    if let Directive::Include(target) = directive {
                        includes.push(target);
                    }
                }
                Ok(LineItem::Case(case)) => {
                    let case = *case;
                    let verdict = self.judge_case(&case);
                    report.cases.push(CaseReport {
                        ordinal: self.ordinal,
                        id: case.id,
                        line: case.line,
                        verdict,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        file = %report.path.display(),
                        line = scanned.line,
                        %err,
                        "unparseable line"
                    );
                    report.parse_errors.push(ParseFailure {
                        line: err.line(),
                        message: err.to_string(),
                    });
                }
            }
        }
        includes
    }

    fn judge_case(&mut self, case: &Case) -> Verdict {
        self.ordinal += 1;
        if let Some(reason) = self.skip_reason(&case.id) {
            return Verdict::Skipped(SkipCause::Excluded(reason));
        }
        if case.uses_encoding() {
            return Verdict::Skipped(SkipCause::Excluded(SkipReason::FixedWidthEncoding));
        }
        if case.is_skip_worthy() {
            return Verdict::Skipped(SkipCause::UnsupportedRounding(case.context.rounding));
        }

        let started = Instant::now();
        let result = self.engine.evaluate(case);
        let elapsed = started.elapsed();
        if elapsed > self.config.slow_threshold {
            tracing::warn!(
                id = %case.id,
                elapsed_ms = elapsed.as_millis(),
                "slow evaluation"
            );
        }

        match result {
            Ok(computed) => match self.oracle.judge(self.ordinal, case, &computed) {
                Ok(()) => Verdict::Passed,
                Err(mismatch) => Verdict::Failed(mismatch),
            },
            Err(EngineError::Unsupported(operation)) => {
                Verdict::Skipped(SkipCause::Unsupported(operation))
            }
            Err(err) => Verdict::Errored(err.to_string()),
        }
    }

    fn skip_reason(&self, id: &str) -> Option<SkipReason> {
        self.config.extra_skips.reason(id).or_else(|| {
            if self.config.builtin_skips {
                SkipSet::builtin().reason(id)
            } else {
                None
            }
        })
    }
}
