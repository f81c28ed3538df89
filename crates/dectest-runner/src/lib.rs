//! Corpus loading, the per-case run loop, and reporting for decTest
//! conformance runs.
//!
//! Drive any [`dectest_core::ArithmeticEngine`] over a corpus with
//! [`Runner`]; the `dectest-run` binary wraps a parse-only survey of the
//! same loop.

#[cfg(test)]
use tempfile as _;

/// Corpus file discovery and include resolution.
pub mod corpus;
pub use corpus::{discover, resolve_include, CorpusError, CorpusFile, IncludeChain};

/// Logging setup.
pub mod logging;

/// Run loop and per-case verdicts.
pub mod runner;
pub use runner::{
    CaseReport, FileReport, ParseFailure, ParseOnly, RunConfig, Runner, SkipCause, Verdict,
    DEFAULT_SLOW_THRESHOLD,
};

/// Totals and JSON output.
pub mod report;
pub use report::{RunOutput, RunSummary};
