#![no_main]

use dectest_core::{
    parse_case, ArithmeticEngine, CaseScanner, Computed, Condition, DirectiveState, EngineContext,
    EngineResult, LineItem, Operation, Oracle,
};
use libfuzzer_sys::fuzz_target;

struct Identity;

impl ArithmeticEngine for Identity {
    fn unary(&mut self, _ctx: &EngineContext, _op: Operation, operand: &str) -> EngineResult {
        match operand.parse() {
            Ok(value) => Ok(Computed::decimal(value, Condition::NONE)),
            Err(_) => Ok(Computed::text(operand, Condition::CONVERSION_SYNTAX)),
        }
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let oracle = Oracle::default();
    for (ordinal, scanned) in CaseScanner::new(text).enumerate() {
        if let Ok(LineItem::Case(case)) = scanned.item {
            assert_eq!(case.inputs.len(), case.operation.operand_count());
            let reparsed = parse_case(&case.to_string(), case.line, &case.context);
            assert_eq!(reparsed.as_ref(), Ok(case.as_ref()));
            if let Ok(computed) = Identity.evaluate(&case) {
                let _ = oracle.judge(ordinal, &case, &computed);
            }
        }
    }

    let _ = parse_case(text, 1, &DirectiveState::default());
});
