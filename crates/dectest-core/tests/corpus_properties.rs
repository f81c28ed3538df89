//! End-to-end properties of directive tracking, case parsing, and judging.

use dectest_core::{
    parse_case, parse_cases, CaseScanner, Computed, Condition, DirectiveState, DirectiveTracker,
    LineItem, MismatchKind, Operation, Oracle, Output, Rounding, RoundingMode, CONDITION_NAMES,
};
use proptest as _;
use rstest::rstest;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;
use tracing as _;

const CORPUS: &str = "\
------------------------------------------------------------------------
-- add.decTest -- decimal addition                                    --
------------------------------------------------------------------------
version: 2.62

extended:    1
precision:   9
rounding:    half_up
maxExponent: 384
minexponent: -383

addx001 add 1       1       ->  2
addx002 add 2       3       ->  5
addx003 add '5.75'  '3.3'   ->  9.05
addx004 add '5'     '-3'    ->  2
addx005 add '-5'    '-3'    ->  -8

precision: 3
addx010 add 1234 1 -> 1.24E+3 Inexact Rounded

rounding: 05up
addx020 add 1 1 -> 2
rounding: half_even
addx021 add 1 1 -> 2

divx001 divide 0 0 -> NaN Division_undefined
dvix001 divideint 1 0 -> Infinity Division_by_zero
pwmx001 power 3 2 5 -> 4
";

#[test]
fn directive_sequence_yields_documented_state() {
    let mut tracker = DirectiveTracker::new();
    for line in [
        "precision: 9",
        "rounding: half_even",
        "maxexponent: 384",
        "minexponent: -384",
        "clamp: 1",
    ] {
        tracker.apply(line).expect("valid directive");
    }
    let state = tracker.state();
    assert_eq!(state.precision, 9);
    assert_eq!(state.rounding, Rounding::Supported(RoundingMode::HalfEven));
    assert_eq!(state.max_exponent, 384);
    assert_eq!(state.min_exponent, -384);
    assert!(state.clamp);
}

#[rstest]
#[case("absx001 abs '1' -> '1'", "absx001", Operation::Abs, &["1"], "1")]
#[case("addx001 add 1 1 -> 2", "addx001", Operation::Add, &["1", "1"], "2")]
#[case("fmax001 fma 2 3 4 -> 10", "fmax001", Operation::Fma, &["2", "3", "4"], "10")]
#[case("redx001 reduce '1.200' -> '1.2'", "redx001", Operation::Reduce, &["1.200"], "1.2")]
fn documented_lines_parse(
    #[case] line: &str,
    #[case] id: &str,
    #[case] operation: Operation,
    #[case] inputs: &[&str],
    #[case] output: &str,
) {
    let case = parse_case(line, 1, &DirectiveState::default()).expect("valid case line");
    assert_eq!(case.id, id);
    assert_eq!(case.operation, operation);
    assert_eq!(case.inputs.len(), operation.operand_count());
    let parsed: Vec<&str> = case.inputs.iter().map(|d| d.unquoted()).collect();
    assert_eq!(parsed, inputs);
    assert_eq!(case.output.datum().map(|d| d.unquoted()), Some(output));
    assert!(case.conditions.is_empty());
}

#[test]
fn no_data_result_is_judged_on_conditions_only() {
    let case = parse_case(
        "divx001 divide 0 0 -> ? Division_undefined",
        1,
        &DirectiveState::default(),
    )
    .expect("valid case line");
    assert_eq!(case.output, Output::NoData);
    assert_eq!(case.conditions, Condition::DIVISION_UNDEFINED);

    let oracle = Oracle::default();
    for value in ["0", "-7.5", "Infinity", "NaN"] {
        let computed = Computed::decimal(
            value.parse().expect("valid literal"),
            Condition::DIVISION_UNDEFINED,
        );
        assert!(oracle.judge(1, &case, &computed).is_ok(), "value {value}");
    }
    let wrong = Computed::decimal(
        "0".parse().expect("valid literal"),
        Condition::DIVISION_UNDEFINED | Condition::INVALID_OPERATION,
    );
    assert!(oracle.judge(1, &case, &wrong).is_err());
}

#[test]
fn every_condition_name_round_trips() {
    for (name, bit) in CONDITION_NAMES {
        let parsed = Condition::from_name(name).expect("vocabulary name");
        let again = Condition::from_name(&parsed.to_string()).expect("rendered name");
        assert_eq!(again, *bit);
    }
}

#[rstest]
#[case("precision: 12")]
#[case("rounding: half_down")]
#[case("minexponent: -95")]
#[case("clamp: 1")]
fn directives_are_idempotent(#[case] line: &str) {
    let mut once = DirectiveTracker::new();
    once.apply(line).expect("valid directive");
    let mut twice = once.clone();
    twice.apply(line).expect("valid directive");
    assert_eq!(once.state(), twice.state());
}

#[test]
fn scale_difference_is_a_failure() {
    let case = parse_case("addx001 add 1 1 -> 2", 1, &DirectiveState::default())
        .expect("valid case line");
    let computed = Computed::decimal("2.0".parse().expect("valid literal"), Condition::NONE);
    let mismatch = Oracle::default()
        .judge(1, &case, &computed)
        .expect_err("scales differ");
    assert_eq!(mismatch.kind, MismatchKind::Scale);
}

#[test]
fn nan_sign_is_distinguished() {
    let case = parse_case("absx001 abs NaN -> NaN", 1, &DirectiveState::default())
        .expect("valid case line");
    let computed = Computed::decimal("-NaN".parse().expect("valid literal"), Condition::NONE);
    let mismatch = Oracle::default()
        .judge(1, &case, &computed)
        .expect_err("signs differ");
    assert_eq!(mismatch.kind, MismatchKind::Sign);
}

#[test]
fn unsupported_rounding_taints_until_superseded() {
    let cases: Vec<_> = parse_cases(CORPUS)
        .into_iter()
        .map(|result| result.expect("valid corpus line"))
        .collect();
    let skip_worthy: Vec<(&str, bool)> = cases
        .iter()
        .map(|case| (case.id.as_str(), case.is_skip_worthy()))
        .collect();
    assert!(skip_worthy.contains(&("addx010", false)));
    assert!(skip_worthy.contains(&("addx020", true)));
    assert!(skip_worthy.contains(&("addx021", false)));
}

#[test]
fn unrecognized_rounding_token_taints_instead_of_failing() {
    let text = "rounding: half_up\nrounding: bankers\naddx001 add 1 1 -> 2\n\
                precision: 5\naddx002 add 1 1 -> 2\nrounding: floor\naddx003 add 1 1 -> 2\n";
    let results = parse_cases(text);
    assert!(results.iter().all(Result::is_ok));
    let cases: Vec<_> = results.into_iter().flatten().collect();
    assert_eq!(cases[0].context.rounding, Rounding::Unrecognized);
    assert!(cases[0].is_skip_worthy());
    assert!(cases[1].is_skip_worthy());
    assert_eq!(cases[1].context.precision, 5);
    assert!(!cases[2].is_skip_worthy());
    assert_eq!(cases[2].context.rounding, Rounding::Supported(RoundingMode::Floor));
}

#[test]
fn scanner_snapshots_follow_directive_order() {
    let mut cases = Vec::new();
    let mut directives = 0;
    for scanned in CaseScanner::new(CORPUS) {
        match scanned.item.expect("valid corpus line") {
            LineItem::Directive(_) => directives += 1,
            LineItem::Case(case) => cases.push(*case),
        }
    }
    assert_eq!(directives, 9);
    assert_eq!(cases.len(), 11);

    let addx001 = &cases[0];
    assert_eq!(addx001.context.precision, 9);
    assert_eq!(addx001.context.max_exponent, 384);
    assert_eq!(addx001.context.min_exponent, -383);
    assert_eq!(addx001.context.version.as_deref(), Some("2.62"));

    let addx010 = cases.iter().find(|c| c.id == "addx010").expect("present");
    assert_eq!(addx010.context.precision, 3);
    assert_eq!(addx010.conditions, Condition::INEXACT | Condition::ROUNDED);

    let pwmx001 = cases.last().expect("non-empty");
    assert_eq!(pwmx001.operation, Operation::PowerModulo);
    assert_eq!(pwmx001.context.rounding, Rounding::Supported(RoundingMode::HalfEven));
}

#[test]
fn case_display_reparses_to_the_same_case() {
    for result in parse_cases(CORPUS) {
        let case = result.expect("valid corpus line");
        let reparsed =
            parse_case(&case.to_string(), case.line, &case.context).expect("rendered line parses");
        assert_eq!(reparsed, case);
    }
}
