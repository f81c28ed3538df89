//! Runs a toy integer engine over small corpora.

use std::fs;
use std::path::Path;

use dectest_core::{
    ArithmeticEngine, Computed, Condition, EngineContext, EngineError, EngineResult, MismatchKind,
    Operation, Rounding, RoundingMode, SkipReason,
};
use dectest_runner::{CorpusError, RunConfig, RunSummary, Runner, SkipCause, Verdict};
use serde as _;
use serde_json as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;

/// Adds integers that fit in an `i64`; nothing else.
#[derive(Default)]
struct IntegerAdder {
    calls: usize,
}

impl ArithmeticEngine for IntegerAdder {
    fn binary(
        &mut self,
        _ctx: &EngineContext,
        operation: Operation,
        lhs: &str,
        rhs: &str,
    ) -> EngineResult {
        if operation != Operation::Add {
            return Err(EngineError::Unsupported(operation));
        }
        self.calls += 1;
        let parse = |text: &str| {
            text.parse::<i64>()
                .map_err(|_| EngineError::Failed(format!("not an integer: {text}")))
        };
        let sum = parse(lhs)? + parse(rhs)?;
        Ok(Computed::decimal(
            sum.to_string().parse().expect("integer literal"),
            Condition::NONE,
        ))
    }
}

const CORPUS: &str = "\
precision: 9
rounding: half_up

addx001 add 1 1 -> 2
addx002 add 2 3 -> 5.0
addx003 add 2 2 -> 5
add900 add 1 1 -> 2
mulx001 multiply 2 3 -> 6
addx005 add 1E+2 1 -> 101

rounding: 05up
addx010 add 1 1 -> 2
rounding: half_even
addx011 add -4 1 -> -3
";

fn verdict_of<'a>(report: &'a dectest_runner::FileReport, id: &str) -> &'a Verdict {
    &report
        .cases
        .iter()
        .find(|case| case.id == id)
        .expect("case present")
        .verdict
}

#[test]
fn verdicts_cover_every_outcome() {
    let mut runner = Runner::new(IntegerAdder::default(), RunConfig::default());
    let report = runner.run_text(Path::new("add.decTest"), CORPUS);

    assert_eq!(verdict_of(&report, "addx001"), &Verdict::Passed);
    assert_eq!(verdict_of(&report, "addx011"), &Verdict::Passed);

    match verdict_of(&report, "addx002") {
        Verdict::Failed(mismatch) => {
            assert_eq!(mismatch.kind, MismatchKind::Scale);
            assert_eq!(mismatch.id, "addx002");
        }
        other => panic!("expected a scale failure, got {other:?}"),
    }
    match verdict_of(&report, "addx003") {
        Verdict::Failed(mismatch) => assert_eq!(mismatch.kind, MismatchKind::Value),
        other => panic!("expected a value failure, got {other:?}"),
    }

    assert_eq!(
        verdict_of(&report, "add900"),
        &Verdict::Skipped(SkipCause::Excluded(SkipReason::FixedWidthEncoding))
    );
    assert_eq!(
        verdict_of(&report, "mulx001"),
        &Verdict::Skipped(SkipCause::Unsupported(Operation::Multiply))
    );
    assert_eq!(
        verdict_of(&report, "addx010"),
        &Verdict::Skipped(SkipCause::UnsupportedRounding(Rounding::Unsupported(
            RoundingMode::ZeroFiveUp
        )))
    );
    assert!(matches!(
        verdict_of(&report, "addx005"),
        Verdict::Errored(message) if message.contains("1E+2")
    ));

    let summary = RunSummary::from_reports(std::slice::from_ref(&report));
    assert_eq!(summary.passed, 2);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.unsupported, 1);
    assert_eq!(summary.errored, 1);
    assert_eq!(summary.total, 8);

    // Skipped cases never reach the engine.
    assert_eq!(runner.engine().calls, 5);
}

#[test]
fn encoded_operands_and_results_are_not_evaluated() {
    let mut runner = Runner::new(IntegerAdder::default(), RunConfig::default());
    let report = runner.run_text(
        Path::new("encoded.decTest"),
        "dece001 add #A23003D0 1 -> 2\n\
         dece002 add 1 1 -> #2238000000000002\n\
         dece003 add 1 1 -> 2\n",
    );

    let encoded = Verdict::Skipped(SkipCause::Excluded(SkipReason::FixedWidthEncoding));
    assert_eq!(verdict_of(&report, "dece001"), &encoded);
    assert_eq!(verdict_of(&report, "dece002"), &encoded);
    assert_eq!(verdict_of(&report, "dece003"), &Verdict::Passed);
    assert_eq!(runner.engine().calls, 1);
}

#[test]
fn unknown_rounding_token_skips_until_a_supported_mode_returns() {
    let mut runner = Runner::new(IntegerAdder::default(), RunConfig::default());
    let report = runner.run_text(
        Path::new("rounding.decTest"),
        "rounding: half_up\nrounding: sideways\naddx001 add 1 1 -> 2\n\
         rounding: half_even\naddx002 add 1 1 -> 2\n",
    );

    assert!(report.parse_errors.is_empty());
    assert_eq!(
        verdict_of(&report, "addx001"),
        &Verdict::Skipped(SkipCause::UnsupportedRounding(Rounding::Unrecognized))
    );
    assert_eq!(verdict_of(&report, "addx002"), &Verdict::Passed);
    assert_eq!(runner.engine().calls, 1);
}

#[test]
fn includes_are_followed_relative_to_the_including_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("testall.decTest"),
        "version: 2.62\ndectest: inner\naddx001 add 1 1 -> 2\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("inner.decTest"),
        "precision: 5\naddx100 add 3 4 -> 7\n",
    )
    .unwrap();

    let mut runner = Runner::new(IntegerAdder::default(), RunConfig::default());
    let reports = runner.run_file(&dir.path().join("testall.decTest")).unwrap();

    assert_eq!(reports.len(), 2);
    assert!(reports[0].path.ends_with("testall.decTest"));
    assert!(reports[1].path.ends_with("inner.decTest"));
    assert_eq!(reports[1].cases[0].id, "addx100");
    assert!(reports.iter().all(dectest_runner::FileReport::is_clean));
}

#[test]
fn directory_runs_every_corpus_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.decTest"), "addx001 add 1 1 -> 2\n").unwrap();
    fs::write(dir.path().join("b.decTest"), "addx002 add 1 2 -> 3\n").unwrap();

    let mut runner = Runner::new(IntegerAdder::default(), RunConfig::default());
    let reports = runner.run_path(dir.path()).unwrap();
    let summary = RunSummary::from_reports(&reports);
    assert_eq!(summary.files, 2);
    assert_eq!(summary.passed, 2);
    assert!(summary.is_clean());
}

#[test]
fn circular_includes_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.decTest"), "dectest: b\n").unwrap();
    fs::write(dir.path().join("b.decTest"), "dectest: a\n").unwrap();

    let mut runner = Runner::new(IntegerAdder::default(), RunConfig::default());
    let err = runner.run_file(&dir.path().join("a.decTest")).unwrap_err();
    assert!(matches!(err, CorpusError::CircularInclude { .. }));
}

#[test]
fn missing_include_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.decTest"), "dectest: absent\n").unwrap();

    let mut runner = Runner::new(IntegerAdder::default(), RunConfig::default());
    let err = runner.run_file(&dir.path().join("a.decTest")).unwrap_err();
    assert!(matches!(err, CorpusError::NotFound { .. }));
}
