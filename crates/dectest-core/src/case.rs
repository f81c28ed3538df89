//! Parsed test cases.

use std::fmt;

use crate::condition::Condition;
use crate::datum::Datum;
use crate::directive::DirectiveState;
use crate::operation::Operation;

/// Expected result of a case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Output {
    /// A literal, special, or quoted result.
    Value(Datum),
    /// `?`: the operation signals conditions without a usable value.
    NoData,
}

impl Output {
    /// The result token, unless this is the no-data sentinel.
    #[must_use]
    pub const fn datum(&self) -> Option<&Datum> {
        match self {
            Self::Value(datum) => Some(datum),
            Self::NoData => None,
        }
    }

    /// Returns true for `?`.
    #[must_use]
    pub const fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(datum) => write!(f, "{datum}"),
            Self::NoData => f.write_str("?"),
        }
    }
}

/// One corpus test vector with the directive context it was written under.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Case {
    /// Case id, unique within its file.
    pub id: String,
    /// Operation under test.
    pub operation: Operation,
    /// Operands; length equals [`Operation::operand_count`].
    pub inputs: Vec<Datum>,
    /// Expected result.
    pub output: Output,
    /// Conditions the operation is expected to raise.
    pub conditions: Condition,
    /// Directive context captured when the line was parsed.
    pub context: DirectiveState,
    /// 1-based source line number.
    pub line: usize,
}

impl Case {
    /// Whether the case runs under a rounding mode the engine lacks.
    #[must_use]
    pub const fn is_skip_worthy(&self) -> bool {
        self.context.is_skip_worthy()
    }

    /// Whether any operand or the result is a `#` encoding.
    #[must_use]
    pub fn uses_encoding(&self) -> bool {
        self.inputs.iter().any(Datum::is_encoded)
            || self.output.datum().is_some_and(Datum::is_encoded)
    }

    /// One-line diagnostic form with operands and result truncated to
    /// `width` characters (0 disables truncation).
    ///
    /// ```text
    /// addx001 [p9, half_up]: add(1, 1) = 2 NoConditions
    /// ```
    #[must_use]
    pub fn summary(&self, width: usize) -> String {
        let inputs: Vec<String> = self
            .inputs
            .iter()
            .map(|datum| truncate(&datum.to_string(), width))
            .collect();
        format!(
            "{} [p{}, {}]: {}({}) = {} {}",
            self.id,
            self.context.precision,
            self.context.rounding,
            self.operation,
            inputs.join(", "),
            truncate(&self.output.to_string(), width),
            self.conditions
        )
    }
}

/// Renders the case back in corpus line syntax.
impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.operation)?;
        for input in &self.inputs {
            write!(f, " {input}")?;
        }
        write!(f, " -> {}", self.output)?;
        for condition in self.conditions.iter() {
            match condition.name() {
                Some(name) => write!(f, " {name}")?,
                None => write!(f, " {condition}")?,
            }
        }
        Ok(())
    }
}

/// Keeps the first and last `width / 2` characters of `text`, joined by
/// `...`, when `text` is longer than `width`.
#[must_use]
pub fn truncate(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if width == 0 || width >= len {
        return text.to_string();
    }
    let half = width / 2;
    let head: String = text.chars().take(half).collect();
    let tail: String = text.chars().skip(len - half).collect();
    format!("{head}...{tail}")
}
