//! Parser, directive tracker, and result oracle for the decTest decimal
//! arithmetic conformance corpus.

#[cfg(test)]
use proptest as _;

/// Decimal literal model: sign, class, scale, precision.
pub mod decimal;
pub use decimal::{scan_literal, DecimalValue, LiteralError, ValueClass};

/// Condition flag set and keyword vocabulary.
pub mod condition;
pub use condition::{Condition, UnknownCondition, CONDITION_NAMES, NO_CONDITIONS};

/// Operation vocabulary with arity classes.
pub mod operation;
pub use operation::{
    is_operation_token, resolve_operation, resolve_operation_with_operand_count, Operation,
    OperationKind, ResultKind,
};

/// Operand and result tokens.
pub mod datum;
pub use datum::{Datum, NanKind};

/// Directive lines and per-file context state.
pub mod directive;
pub use directive::{
    Directive, DirectiveError, DirectiveState, DirectiveTracker, Rounding, RoundingMode,
    DEFAULT_SUPPORTED_ROUNDING,
};

mod lexer;

/// Case-line grammar parser.
pub mod parser;
pub use parser::{parse_case, ParseError, ParseErrorKind, SourceLocation};

/// Parsed case records.
pub mod case;
pub use case::{truncate, Case, Output};

/// Whole-file line scanner.
pub mod scanner;
pub use scanner::{parse_cases, CaseScanner, LineError, LineItem, ScannedLine};

/// Arithmetic engine contract.
pub mod engine;
pub use engine::{
    ArithmeticEngine, Computed, ComputedValue, EngineContext, EngineError, EngineResult,
    Invocation,
};

/// Result equivalence oracle.
pub mod oracle;
pub use oracle::{
    Mismatch, MismatchKind, Observed, Oracle, OracleConfig, DEFAULT_DIAGNOSTIC_WIDTH,
};

/// Excluded case ids.
pub mod skip;
pub use skip::{SkipReason, SkipSet};
