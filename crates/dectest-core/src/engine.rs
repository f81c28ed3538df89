//! Contract for the arithmetic engine under test.
//!
//! The harness never computes decimal results itself. An engine implements
//! [`ArithmeticEngine`] for whichever arity classes it supports; everything
//! else falls through to [`EngineError::Unsupported`], which drivers report as
//! a skip rather than a failure.

use thiserror::Error;

use crate::case::Case;
use crate::condition::Condition;
use crate::datum::Datum;
use crate::decimal::DecimalValue;
use crate::directive::{DirectiveState, RoundingMode};
use crate::operation::{Operation, OperationKind};

/// Arithmetic context handed to the engine for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct EngineContext {
    /// Working precision in digits.
    pub precision: u32,
    /// Rounding mode in effect.
    pub rounding: RoundingMode,
    /// Largest adjusted exponent.
    pub max_exponent: i64,
    /// Smallest adjusted exponent of a normal number.
    pub min_exponent: i64,
    /// IEEE exponent clamping.
    pub clamp: bool,
    /// Extended arithmetic rather than the X3.274 subset.
    pub extended: bool,
}

impl EngineContext {
    /// Derives the engine context from a case's directive snapshot.
    ///
    /// An unrecognized rounding token maps to `half_up`; such cases are
    /// skip-worthy and drivers do not evaluate them.
    #[must_use]
    pub const fn from_state(state: &DirectiveState) -> Self {
        let rounding = match state.rounding.mode() {
            Some(mode) => mode,
            None => RoundingMode::HalfUp,
        };
        Self {
            precision: state.precision,
            rounding,
            max_exponent: state.max_exponent,
            min_exponent: state.min_exponent,
            clamp: state.clamp,
            extended: state.extended,
        }
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::from_state(&DirectiveState::default())
    }
}

/// Result payload produced by an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ComputedValue {
    /// A decimal result for numeric operations.
    Decimal(DecimalValue),
    /// A string result for `class`, `tosci`, `toeng`, `sign`, `signbit`.
    Text(String),
}

/// An engine's answer for one case.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Computed {
    /// Result value.
    pub value: ComputedValue,
    /// Conditions raised while computing it.
    pub conditions: Condition,
}

impl Computed {
    /// A decimal result.
    #[must_use]
    pub const fn decimal(value: DecimalValue, conditions: Condition) -> Self {
        Self {
            value: ComputedValue::Decimal(value),
            conditions,
        }
    }

    /// A textual result.
    #[must_use]
    pub fn text(value: impl Into<String>, conditions: Condition) -> Self {
        Self {
            value: ComputedValue::Text(value.into()),
            conditions,
        }
    }
}

/// Reasons an engine produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum EngineError {
    /// The engine does not implement the operation.
    #[error("operation {0} is not implemented")]
    Unsupported(Operation),
    /// Case operands do not match the operation's arity.
    #[error("{operation} expects {expected} operand(s), case has {found}")]
    Arity {
        /// Operation being invoked.
        operation: Operation,
        /// Operands the operation takes.
        expected: usize,
        /// Operands on the case.
        found: usize,
    },
    /// The engine failed for an engine-specific reason.
    #[error("engine failure: {0}")]
    Failed(String),
}

/// Engine call result.
pub type EngineResult = Result<Computed, EngineError>;

/// A case's operation and quote-stripped operands, split by arity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation<'a> {
    /// In-place transformation of one operand.
    Nilary {
        /// Operation to apply.
        operation: Operation,
        /// The operand.
        operand: &'a str,
    },
    /// One operand.
    Unary {
        /// Operation to apply.
        operation: Operation,
        /// The operand.
        operand: &'a str,
    },
    /// Two operands.
    Binary {
        /// Operation to apply.
        operation: Operation,
        /// Left operand.
        lhs: &'a str,
        /// Right operand.
        rhs: &'a str,
    },
    /// Three operands.
    Ternary {
        /// Operation to apply.
        operation: Operation,
        /// Operands in corpus order.
        operands: [&'a str; 3],
    },
    /// Classification, comparison, quantization, shift, or conversion.
    Other {
        /// Operation to apply.
        operation: Operation,
        /// Operands in corpus order (one or two).
        operands: &'a [Datum],
    },
}

impl<'a> Invocation<'a> {
    /// Splits `case` by its operation's arity class.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Arity`] when the case's operand count does not
    /// match its operation.
    pub fn from_case(case: &'a Case) -> Result<Self, EngineError> {
        let operation = case.operation;
        let expected = operation.operand_count();
        if case.inputs.len() != expected {
            return Err(EngineError::Arity {
                operation,
                expected,
                found: case.inputs.len(),
            });
        }
        let arg = move |idx: usize| case.inputs[idx].unquoted();
        Ok(match operation.kind() {
            OperationKind::Nilary => Self::Nilary {
                operation,
                operand: arg(0),
            },
            OperationKind::Unary => Self::Unary {
                operation,
                operand: arg(0),
            },
            OperationKind::Binary => Self::Binary {
                operation,
                lhs: arg(0),
                rhs: arg(1),
            },
            OperationKind::Ternary => Self::Ternary {
                operation,
                operands: [arg(0), arg(1), arg(2)],
            },
            OperationKind::Other => Self::Other {
                operation,
                operands: &case.inputs,
            },
        })
    }

    /// The operation being invoked.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        match self {
            Self::Nilary { operation, .. }
            | Self::Unary { operation, .. }
            | Self::Binary { operation, .. }
            | Self::Ternary { operation, .. }
            | Self::Other { operation, .. } => *operation,
        }
    }
}

/// A decimal arithmetic implementation driven by the corpus.
///
/// Every method defaults to [`EngineError::Unsupported`]; implement only the
/// arity classes the engine supports. Operands are the quote-stripped corpus
/// text, so the engine's own string conversion is exercised too.
pub trait ArithmeticEngine {
    /// Transforms one operand in place (`reduce`, `tointegral`, ...).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when no result can be produced.
    fn nilary(&mut self, ctx: &EngineContext, operation: Operation, operand: &str) -> EngineResult {
        let _ = (ctx, operand);
        Err(EngineError::Unsupported(operation))
    }

    /// Computes a one-operand operation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when no result can be produced.
    fn unary(&mut self, ctx: &EngineContext, operation: Operation, operand: &str) -> EngineResult {
        let _ = (ctx, operand);
        Err(EngineError::Unsupported(operation))
    }

    /// Computes a two-operand operation.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when no result can be produced.
    fn binary(
        &mut self,
        ctx: &EngineContext,
        operation: Operation,
        lhs: &str,
        rhs: &str,
    ) -> EngineResult {
        let _ = (ctx, lhs, rhs);
        Err(EngineError::Unsupported(operation))
    }

    /// Computes a three-operand operation (`fma`, modular `power`).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when no result can be produced.
    fn ternary(
        &mut self,
        ctx: &EngineContext,
        operation: Operation,
        operands: [&str; 3],
    ) -> EngineResult {
        let _ = (ctx, operands);
        Err(EngineError::Unsupported(operation))
    }

    /// Computes an operation outside the arithmetic arity classes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when no result can be produced.
    fn other(
        &mut self,
        ctx: &EngineContext,
        operation: Operation,
        operands: &[&str],
    ) -> EngineResult {
        let _ = (ctx, operands);
        Err(EngineError::Unsupported(operation))
    }

    /// Dispatches `case` to the method for its arity class.
    ///
    /// # Errors
    ///
    /// Propagates the engine's error, or [`EngineError::Arity`] for a case
    /// whose operands do not match its operation.
    fn evaluate(&mut self, case: &Case) -> EngineResult {
        let ctx = EngineContext::from_state(&case.context);
        match Invocation::from_case(case)? {
            Invocation::Nilary { operation, operand } => self.nilary(&ctx, operation, operand),
            Invocation::Unary { operation, operand } => self.unary(&ctx, operation, operand),
            Invocation::Binary {
                operation,
                lhs,
                rhs,
            } => self.binary(&ctx, operation, lhs, rhs),
            Invocation::Ternary {
                operation,
                operands,
            } => self.ternary(&ctx, operation, operands),
            Invocation::Other {
                operation,
                operands,
            } => {
                let operands: Vec<&str> = operands.iter().map(Datum::unquoted).collect();
                self.other(&ctx, operation, &operands)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ArithmeticEngine, Computed, EngineContext, EngineError, EngineResult, Invocation};
    use crate::condition::Condition;
    use crate::directive::{DirectiveState, Rounding, RoundingMode};
    use crate::operation::Operation;
    use crate::parser::parse_case;

    struct Echo;

    impl ArithmeticEngine for Echo {
        fn binary(
            &mut self,
            ctx: &EngineContext,
            operation: Operation,
            lhs: &str,
            rhs: &str,
        ) -> EngineResult {
            Ok(Computed::text(
                format!("{operation}:{lhs}:{rhs}:{}", ctx.precision),
                Condition::NONE,
            ))
        }
    }

    fn case(line: &str) -> crate::case::Case {
        parse_case(line, 1, &DirectiveState::default()).expect("valid case line")
    }

    #[test]
    fn binary_dispatch_receives_unquoted_operands_and_context() {
        let computed = Echo.evaluate(&case("addx001 add '1' 2 -> 3")).expect("binary implemented");
        assert_eq!(computed, Computed::text("add:1:2:9", Condition::NONE));
    }

    #[test]
    fn unimplemented_arity_classes_are_unsupported() {
        assert_eq!(
            Echo.evaluate(&case("absx001 abs 1 -> 1")),
            Err(EngineError::Unsupported(Operation::Abs))
        );
        assert_eq!(
            Echo.evaluate(&case("fmax001 fma 1 2 3 -> 5")),
            Err(EngineError::Unsupported(Operation::Fma))
        );
        assert_eq!(
            Echo.evaluate(&case("clas001 class 1 -> '+Normal'")),
            Err(EngineError::Unsupported(Operation::Class))
        );
    }

    #[test]
    fn invocation_splits_by_arity_class() {
        let reduce = case("redx001 reduce 1.00 -> 1");
        assert!(matches!(
            Invocation::from_case(&reduce),
            Ok(Invocation::Nilary { operand: "1.00", .. })
        ));
        let fma = case("fmax001 fma 1 2 3 -> 5");
        assert!(matches!(
            Invocation::from_case(&fma),
            Ok(Invocation::Ternary { operands: ["1", "2", "3"], .. })
        ));
        let quantize = case("quax001 quantize 1 1e-2 -> 1.00");
        let invocation = Invocation::from_case(&quantize).expect("two operands");
        assert_eq!(invocation.operation(), Operation::Quantize);
    }

    #[test]
    fn mismatched_operand_count_is_an_arity_error() {
        let mut broken = case("addx001 add 1 1 -> 2");
        broken.inputs.pop();
        assert_eq!(
            Invocation::from_case(&broken),
            Err(EngineError::Arity {
                operation: Operation::Add,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn context_mirrors_directive_snapshot() {
        let state = DirectiveState {
            precision: 34,
            max_exponent: 6144,
            min_exponent: -6143,
            clamp: true,
            ..DirectiveState::default()
        };
        let ctx = EngineContext::from_state(&state);
        assert_eq!(ctx.precision, 34);
        assert_eq!(ctx.rounding, RoundingMode::HalfUp);
        assert_eq!((ctx.min_exponent, ctx.max_exponent), (-6143, 6144));
        assert!(ctx.clamp);
    }

    #[test]
    fn latched_rounding_keeps_its_mode_in_the_context() {
        let mut state = DirectiveState {
            rounding: Rounding::Unsupported(RoundingMode::ZeroFiveUp),
            ..DirectiveState::default()
        };
        assert_eq!(EngineContext::from_state(&state).rounding, RoundingMode::ZeroFiveUp);
        state.rounding = Rounding::Unrecognized;
        assert_eq!(EngineContext::from_state(&state).rounding, RoundingMode::HalfUp);
    }
}
