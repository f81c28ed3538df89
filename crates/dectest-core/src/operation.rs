//! Operation vocabulary: corpus tokens, arity classes, and result kinds.

use std::fmt;

/// Dispatch class of an operation.
///
/// Nilary operations transform their single operand in place (no separate
/// receiver), unary through ternary operations produce a new value from one
/// to three operands, and `Other` covers operations whose result is not a
/// plain arithmetic value (classification, comparison, conversions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum OperationKind {
    /// In-place transformation of one operand.
    Nilary,
    /// One operand.
    Unary,
    /// Two operands.
    Binary,
    /// Three operands.
    Ternary,
    /// Classification, comparison, quantization, shifts, and conversions.
    Other,
}

/// How an operation's expected result is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ResultKind {
    /// A decimal value judged by sign, class, conditions, value, and scale.
    Numeric,
    /// A string judged by exact text equality.
    Textual,
}

/// An operation named by a corpus case line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Operation {
    Abs,
    Add,
    And,
    Apply,
    Canonical,
    Class,
    Compare,
    CompareSig,
    CompareTotal,
    CompareTotalMag,
    Copy,
    CopyAbs,
    CopyNegate,
    CopySign,
    Divide,
    DivideInt,
    Exp,
    Fma,
    Invert,
    Ln,
    Log10,
    Logb,
    Max,
    MaxMag,
    Min,
    MinMag,
    Minus,
    Multiply,
    NextMinus,
    NextPlus,
    NextToward,
    Or,
    Plus,
    Power,
    PowerModulo,
    Quantize,
    Reduce,
    Remainder,
    RemainderNear,
    Rescale,
    Rotate,
    SameQuantum,
    ScaleB,
    Shift,
    Sign,
    Signbit,
    SquareRoot,
    Subtract,
    ToEng,
    ToIntegral,
    ToIntegralExact,
    ToSci,
    Trim,
    Xor,
}

/// The token shared by two-operand power and three-operand modular power.
const POWER_TOKEN: &str = "power";

impl Operation {
    /// Every operation, in token order.
    pub const ALL: [Self; 54] = [
        Self::Abs,
        Self::Add,
        Self::And,
        Self::Apply,
        Self::Canonical,
        Self::Class,
        Self::Compare,
        Self::CompareSig,
        Self::CompareTotal,
        Self::CompareTotalMag,
        Self::Copy,
        Self::CopyAbs,
        Self::CopyNegate,
        Self::CopySign,
        Self::Divide,
        Self::DivideInt,
        Self::Exp,
        Self::Fma,
        Self::Invert,
        Self::Ln,
        Self::Log10,
        Self::Logb,
        Self::Max,
        Self::MaxMag,
        Self::Min,
        Self::MinMag,
        Self::Minus,
        Self::Multiply,
        Self::NextMinus,
        Self::NextPlus,
        Self::NextToward,
        Self::Or,
        Self::Plus,
        Self::Power,
        Self::PowerModulo,
        Self::Quantize,
        Self::Reduce,
        Self::Remainder,
        Self::RemainderNear,
        Self::Rescale,
        Self::Rotate,
        Self::SameQuantum,
        Self::ScaleB,
        Self::Shift,
        Self::Sign,
        Self::Signbit,
        Self::SquareRoot,
        Self::Subtract,
        Self::ToEng,
        Self::ToIntegral,
        Self::ToIntegralExact,
        Self::ToSci,
        Self::Trim,
        Self::Xor,
    ];

    /// The corpus token for this operation.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Add => "add",
            Self::And => "and",
            Self::Apply => "apply",
            Self::Canonical => "canonical",
            Self::Class => "class",
            Self::Compare => "compare",
            Self::CompareSig => "comparesig",
            Self::CompareTotal => "comparetotal",
            Self::CompareTotalMag => "comparetotmag",
            Self::Copy => "copy",
            Self::CopyAbs => "copyabs",
            Self::CopyNegate => "copynegate",
            Self::CopySign => "copysign",
            Self::Divide => "divide",
            Self::DivideInt => "divideint",
            Self::Exp => "exp",
            Self::Fma => "fma",
            Self::Invert => "invert",
            Self::Ln => "ln",
            Self::Log10 => "log10",
            Self::Logb => "logb",
            Self::Max => "max",
            Self::MaxMag => "maxmag",
            Self::Min => "min",
            Self::MinMag => "minmag",
            Self::Minus => "minus",
            Self::Multiply => "multiply",
            Self::NextMinus => "nextminus",
            Self::NextPlus => "nextplus",
            Self::NextToward => "nexttoward",
            Self::Or => "or",
            Self::Plus => "plus",
            Self::Power | Self::PowerModulo => POWER_TOKEN,
            Self::Quantize => "quantize",
            Self::Reduce => "reduce",
            Self::Remainder => "remainder",
            Self::RemainderNear => "remaindernear",
            Self::Rescale => "rescale",
            Self::Rotate => "rotate",
            Self::SameQuantum => "samequantum",
            Self::ScaleB => "scaleb",
            Self::Shift => "shift",
            Self::Sign => "sign",
            Self::Signbit => "signbit",
            Self::SquareRoot => "squareroot",
            Self::Subtract => "subtract",
            Self::ToEng => "toeng",
            Self::ToIntegral => "tointegral",
            Self::ToIntegralExact => "tointegralx",
            Self::ToSci => "tosci",
            Self::Trim => "trim",
            Self::Xor => "xor",
        }
    }

    /// The dispatch class.
    #[must_use]
    pub const fn kind(self) -> OperationKind {
        match self {
            Self::Canonical
            | Self::Reduce
            | Self::ToIntegral
            | Self::ToIntegralExact
            | Self::Trim => OperationKind::Nilary,
            Self::Abs
            | Self::Copy
            | Self::CopyAbs
            | Self::CopyNegate
            | Self::Exp
            | Self::Invert
            | Self::Ln
            | Self::Log10
            | Self::Logb
            | Self::Minus
            | Self::NextMinus
            | Self::NextPlus
            | Self::Plus
            | Self::SquareRoot => OperationKind::Unary,
            Self::Add
            | Self::And
            | Self::CopySign
            | Self::Divide
            | Self::DivideInt
            | Self::Max
            | Self::MaxMag
            | Self::Min
            | Self::MinMag
            | Self::Multiply
            | Self::NextToward
            | Self::Or
            | Self::Power
            | Self::Remainder
            | Self::RemainderNear
            | Self::Rescale
            | Self::Rotate
            | Self::SameQuantum
            | Self::ScaleB
            | Self::Subtract
            | Self::Xor => OperationKind::Binary,
            Self::Fma | Self::PowerModulo => OperationKind::Ternary,
            Self::Apply
            | Self::Class
            | Self::Compare
            | Self::CompareSig
            | Self::CompareTotal
            | Self::CompareTotalMag
            | Self::Quantize
            | Self::Shift
            | Self::Sign
            | Self::Signbit
            | Self::ToEng
            | Self::ToSci => OperationKind::Other,
        }
    }

    /// Number of operands a case line must supply.
    #[must_use]
    pub const fn operand_count(self) -> usize {
        match self.kind() {
            OperationKind::Nilary | OperationKind::Unary => 1,
            OperationKind::Binary => 2,
            OperationKind::Ternary => 3,
            OperationKind::Other => match self {
                Self::Compare
                | Self::CompareSig
                | Self::CompareTotal
                | Self::CompareTotalMag
                | Self::Quantize
                | Self::Shift => 2,
                _ => 1,
            },
        }
    }

    /// How the expected result is compared.
    #[must_use]
    pub const fn result_kind(self) -> ResultKind {
        match self {
            Self::Class | Self::Sign | Self::Signbit | Self::ToEng | Self::ToSci => {
                ResultKind::Textual
            }
            _ => ResultKind::Numeric,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// Returns true when `token` names any operation.
///
/// Matching is ASCII case-insensitive.
#[must_use]
pub fn is_operation_token(token: &str) -> bool {
    Operation::ALL
        .iter()
        .any(|op| op.token().eq_ignore_ascii_case(token))
}

/// Resolves a token to its operation, taking the first entry for overloaded
/// tokens (`power` resolves to [`Operation::Power`]).
#[must_use]
pub fn resolve_operation(token: &str) -> Option<Operation> {
    Operation::ALL
        .iter()
        .copied()
        .find(|op| op.token().eq_ignore_ascii_case(token))
}

/// Resolves a token while disambiguating overloads by operand count.
///
/// `power` with three operands is modular power; every other token must be
/// given exactly its operand count.
#[must_use]
pub fn resolve_operation_with_operand_count(token: &str, operands: usize) -> Option<Operation> {
    Operation::ALL
        .iter()
        .copied()
        .find(|op| op.token().eq_ignore_ascii_case(token) && op.operand_count() == operands)
}
