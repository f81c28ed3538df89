//! Pass/fail judgement of an engine result against a case.
//!
//! Numeric results are compared the way IEEE 754-2008 decimal semantics
//! distinguish values, short-circuiting at the first difference:
//!
//! 1. sign bit (so `0` and `-0` differ);
//! 2. finiteness class; two infinities, or two NaNs of the same signaling
//!    class, are equal without further checks;
//! 3. raised conditions, with [`OracleConfig::ignored_conditions`] masked out
//!    unless the case itself expects them;
//! 4. exact numeric value, scale, and precision.
//!
//! A `?` expected result asserts only the conditions. Textual operations
//! (`class`, `tosci`, ...) compare strings exactly, then conditions.

use std::fmt;

use crate::case::{Case, Output};
use crate::condition::Condition;
use crate::decimal::DecimalValue;
use crate::engine::{Computed, ComputedValue};
use crate::operation::ResultKind;

/// Default operand truncation width in diagnostics.
pub const DEFAULT_DIAGNOSTIC_WIDTH: usize = 22;

/// Oracle policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct OracleConfig {
    /// Conditions ignored in the comparison unless the case expects them.
    pub ignored_conditions: Condition,
    /// Operand and result truncation width for diagnostics (0 = no limit).
    pub diagnostic_width: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            ignored_conditions: Condition::DIVISION_UNDEFINED,
            diagnostic_width: DEFAULT_DIAGNOSTIC_WIDTH,
        }
    }
}

/// First property on which a result differed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum MismatchKind {
    /// Sign bits differ.
    Sign,
    /// One side is finite, infinite, or NaN and the other is not.
    Class,
    /// Both NaN but one is signaling.
    NanSignal,
    /// Raised conditions differ after masking.
    Conditions,
    /// Finite values differ numerically.
    Value,
    /// Values are numerically equal but scales differ.
    Scale,
    /// Significant-digit counts differ.
    Precision,
    /// Textual result differs.
    Text,
    /// The case's expected result is not a decimal literal.
    MalformedExpected,
    /// The engine's textual result for a numeric operation is not a decimal.
    UnparseableResult,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Sign => "sign",
            Self::Class => "class",
            Self::NanSignal => "NaN signaling class",
            Self::Conditions => "conditions",
            Self::Value => "value",
            Self::Scale => "scale",
            Self::Precision => "precision",
            Self::Text => "text",
            Self::MalformedExpected => "malformed expected result",
            Self::UnparseableResult => "unparseable result",
        };
        f.write_str(text)
    }
}

/// One side of a failed comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Observed {
    /// Rendered value, truncated to the diagnostic width.
    pub value: String,
    /// Conditions on this side.
    pub conditions: Condition,
    /// Scale (the exponent), for finite decimal values.
    pub scale: Option<i128>,
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({}:", self.value, self.conditions)?;
        match self.scale {
            Some(scale) => write!(f, "{scale})"),
            None => f.write_str("-)"),
        }
    }
}

/// A failed judgement with its diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Mismatch {
    /// Ordinal of the case in its run.
    pub ordinal: usize,
    /// Case id.
    pub id: String,
    /// What differed first.
    pub kind: MismatchKind,
    /// One-line case summary.
    pub summary: String,
    /// Expected side.
    pub expected: Observed,
    /// Computed side.
    pub actual: Observed,
}

/// Renders the multi-line diagnostic:
///
/// ```text
/// #1: addx001 [p9, half_up]: add(1, 1) = 2 NoConditions
/// mismatch: scale
/// wanted: "2" (NoConditions:0)
/// got   : "2.0" (NoConditions:-1)
/// ```
impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#{}: {}", self.ordinal, self.summary)?;
        writeln!(f, "mismatch: {}", self.kind)?;
        writeln!(f, "wanted: {}", self.expected)?;
        write!(f, "got   : {}", self.actual)
    }
}

impl std::error::Error for Mismatch {}

/// Decides whether computed results match their cases.
#[derive(Debug, Clone, Default)]
pub struct Oracle {
    config: OracleConfig,
}

impl Oracle {
    /// Creates an oracle with `config`.
    #[must_use]
    pub const fn new(config: OracleConfig) -> Self {
        Self { config }
    }

    /// The active policy.
    #[must_use]
    pub const fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// Judges `computed` against `case`.
    ///
    /// `ordinal` only labels the diagnostic.
    ///
    /// # Errors
    ///
    /// Returns the first [`Mismatch`] found.
    pub fn judge(&self, ordinal: usize, case: &Case, computed: &Computed) -> Result<(), Mismatch> {
        let judgement = Judgement {
            config: &self.config,
            ordinal,
            case,
            computed,
        };
        let outcome = match case.operation.result_kind() {
            ResultKind::Textual => judgement.textual(),
            ResultKind::Numeric => judgement.numeric(),
        };
        if let Err(mismatch) = &outcome {
            tracing::debug!(id = %case.id, kind = %mismatch.kind, "result mismatch");
        }
        outcome
    }
}

struct Judgement<'a> {
    config: &'a OracleConfig,
    ordinal: usize,
    case: &'a Case,
    computed: &'a Computed,
}

impl Judgement<'_> {
    fn textual(&self) -> Result<(), Mismatch> {
        let actual = match &self.computed.value {
            ComputedValue::Text(text) => text.clone(),
            ComputedValue::Decimal(value) => value.to_string(),
        };
        if let Output::Value(expected) = &self.case.output {
            if expected.unquoted() != actual {
                return Err(self.mismatch(MismatchKind::Text, expected.unquoted(), None));
            }
        }
        self.conditions(None)
    }

    fn numeric(&self) -> Result<(), Mismatch> {
        let expected = match &self.case.output {
            Output::NoData => return self.conditions(None),
            Output::Value(datum) => match datum.unquoted().parse::<DecimalValue>() {
                Ok(value) => value,
                Err(_) => {
                    return Err(self.mismatch(
                        MismatchKind::MalformedExpected,
                        datum.unquoted(),
                        None,
                    ))
                }
            },
        };

        let actual = match &self.computed.value {
            ComputedValue::Decimal(value) => value.clone(),
            ComputedValue::Text(text) => match text.parse::<DecimalValue>() {
                Ok(value) => value,
                Err(_) => {
                    return Err(self.decimal_mismatch(MismatchKind::UnparseableResult, &expected));
                }
            },
        };

        if actual.is_negative() != expected.is_negative() {
            return Err(self.decimal_mismatch(MismatchKind::Sign, &expected));
        }
        if actual.class() != expected.class() {
            return Err(self.decimal_mismatch(MismatchKind::Class, &expected));
        }
        match (&actual, &expected) {
            (DecimalValue::Infinite { .. }, DecimalValue::Infinite { .. }) => return Ok(()),
            (DecimalValue::NaN { .. }, DecimalValue::NaN { .. }) => {
                if actual.is_signaling() != expected.is_signaling() {
                    return Err(self.decimal_mismatch(MismatchKind::NanSignal, &expected));
                }
                return Ok(());
            }
            _ => {}
        }

        self.conditions(Some(&expected))?;

        if actual.numeric_eq(&expected) != Some(true) {
            return Err(self.decimal_mismatch(MismatchKind::Value, &expected));
        }
        if actual.scale() != expected.scale() {
            return Err(self.decimal_mismatch(MismatchKind::Scale, &expected));
        }
        if actual.precision() != expected.precision() {
            return Err(self.decimal_mismatch(MismatchKind::Precision, &expected));
        }
        Ok(())
    }

    fn conditions(&self, expected: Option<&DecimalValue>) -> Result<(), Mismatch> {
        let mask = self
            .config
            .ignored_conditions
            .difference(self.case.conditions);
        if self.computed.conditions.difference(mask) == self.case.conditions.difference(mask) {
            return Ok(());
        }
        Err(match expected {
            Some(value) => self.decimal_mismatch(MismatchKind::Conditions, value),
            None => self.mismatch(MismatchKind::Conditions, &self.expected_text(), None),
        })
    }

    fn expected_text(&self) -> String {
        match &self.case.output {
            Output::Value(datum) => datum.unquoted().to_string(),
            Output::NoData => DecimalValue::infinity(false).to_string(),
        }
    }

    fn decimal_mismatch(&self, kind: MismatchKind, expected: &DecimalValue) -> Mismatch {
        self.mismatch(kind, &expected.to_string(), expected.scale())
    }

    fn mismatch(
        &self,
        kind: MismatchKind,
        expected: &str,
        expected_scale: Option<i128>,
    ) -> Mismatch {
        let width = self.config.diagnostic_width;
        let (actual_value, actual_scale) = match &self.computed.value {
            ComputedValue::Decimal(value) => (value.to_string(), value.scale()),
            ComputedValue::Text(text) => (text.clone(), None),
        };
        Mismatch {
            ordinal: self.ordinal,
            id: self.case.id.clone(),
            kind,
            summary: self.case.summary(width),
            expected: Observed {
                value: crate::case::truncate(expected, width),
                conditions: self.case.conditions,
                scale: expected_scale,
            },
            actual: Observed {
                value: crate::case::truncate(&actual_value, width),
                conditions: self.computed.conditions,
                scale: actual_scale,
            },
        }
    }
}
